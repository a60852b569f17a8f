//! Best-score persistence backed by a small JSON file.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error, Result};
use hakoiri_system_score::ScoreStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreFile {
    best: Option<u32>,
}

/// Stores the fewest-moves record as `{"best": N}`.
#[derive(Debug)]
pub(crate) struct JsonScoreStore {
    path: PathBuf,
    best: Option<u32>,
}

impl JsonScoreStore {
    /// Opens the store, treating a missing file as "no record yet".
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let best = match fs::read_to_string(&path) {
            Ok(contents) => {
                let file: ScoreFile = serde_json::from_str(&contents).with_context(|| {
                    format!("failed to parse best score file at {}", path.display())
                })?;
                file.best
            }
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                return Err(Error::new(error).context(format!(
                    "failed to read best score file at {}",
                    path.display()
                )))
            }
        };
        Ok(Self { path, best })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonScoreStore {
    type Error = Error;

    fn best(&self) -> Option<u32> {
        self.best
    }

    fn save_best(&mut self, moves: u32) -> Result<(), Self::Error> {
        let contents = serde_json::to_string(&ScoreFile { best: Some(moves) })
            .context("failed to encode best score")?;
        fs::write(&self.path, contents).with_context(|| {
            format!("failed to write best score file at {}", self.path.display())
        })?;
        self.best = Some(moves);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!(
            "hakoiri-{name}-{}-{nanos}.json",
            std::process::id()
        ))
    }

    #[test]
    fn missing_file_means_no_record() {
        let path = scratch_path("missing");
        let store = JsonScoreStore::open(&path).expect("missing file is fine");
        assert_eq!(store.best(), None);
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn saved_record_survives_reopening() {
        let path = scratch_path("reopen");
        let mut store = JsonScoreStore::open(&path).expect("open");
        store.save_best(81).expect("write record");

        let contents = fs::read_to_string(&path).expect("file written");
        assert_eq!(contents, r#"{"best":81}"#);
        let reopened = JsonScoreStore::open(&path).expect("reopen");
        assert_eq!(reopened.best(), Some(81));

        fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = scratch_path("corrupt");
        fs::write(&path, "not json").expect("seed corrupt file");

        let error = JsonScoreStore::open(&path).expect_err("corrupt file");
        assert!(error.to_string().contains("failed to parse best score file"));

        fs::remove_file(&path).expect("cleanup");
    }
}
