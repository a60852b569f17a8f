//! Optional TOML configuration merged with command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Cell size used when neither the flag nor the file provides one.
pub(crate) const DEFAULT_CELL_SIZE: f32 = 80.0;

/// Values read from the configuration file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) cell_size: Option<f32>,
    pub(crate) best_score_file: Option<PathBuf>,
    pub(crate) show_labels: Option<bool>,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid config toml")
    }
}

/// Overrides supplied on the command line.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FlagOverrides {
    pub(crate) cell_size: Option<f32>,
    pub(crate) best_score_file: Option<PathBuf>,
}

/// Effective settings after applying flag > file > default precedence.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) cell_size: f32,
    pub(crate) best_score_file: Option<PathBuf>,
    pub(crate) show_labels: bool,
}

impl Settings {
    pub(crate) fn resolve(flags: FlagOverrides, file: FileConfig) -> Self {
        Self {
            cell_size: flags
                .cell_size
                .or(file.cell_size)
                .unwrap_or(DEFAULT_CELL_SIZE),
            best_score_file: flags.best_score_file.or(file.best_score_file),
            show_labels: file.show_labels.unwrap_or(true),
        }
    }
}
