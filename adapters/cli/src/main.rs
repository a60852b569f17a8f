#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the Hakoiri sliding-block puzzle.

mod config;
mod score_store;
mod script;
mod session;
mod terminal;

use std::{
    fmt,
    io::{self, IsTerminal, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use hakoiri_core::WELCOME_BANNER;
use hakoiri_rendering::{BoardPresentation, Color, Presentation, RenderingBackend};
use hakoiri_system_score::{MemoryScoreStore, ScoreStore};
use hakoiri_world::{query, Puzzle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{FileConfig, FlagOverrides, Settings},
    score_store::JsonScoreStore,
    session::Session,
    terminal::{render_text, TerminalBackend},
};

/// Play the Hakoiri musume sliding-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(name = "hakoiri", version, about)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Pixel size of a board cell used for pointer coordinates.
    #[arg(long, value_name = "PX")]
    cell_size: Option<f32>,
    /// JSON file used to persist the fewest-moves record.
    #[arg(long, value_name = "PATH")]
    best_score_file: Option<PathBuf>,
    /// Apply comma separated `piece:direction` moves, print the board and exit.
    #[arg(long, value_name = "SCRIPT")]
    moves: Option<String>,
    /// Print the final state as JSON instead of a text board (scripted mode only).
    #[arg(long, requires = "moves")]
    json: bool,
}

/// Entry point for the Hakoiri command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        FlagOverrides {
            cell_size: cli.cell_size,
            best_score_file: cli.best_score_file.clone(),
        },
        file,
    );
    info!(?settings, "resolved settings");

    match &settings.best_score_file {
        Some(path) => {
            let store = JsonScoreStore::open(path)?;
            info!(path = %store.path().display(), best = ?store.best(), "loaded best score");
            run(&cli, &settings, store)
        }
        None => run(&cli, &settings, MemoryScoreStore::default()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn run<S>(cli: &Cli, settings: &Settings, store: S) -> Result<()>
where
    S: ScoreStore,
    S::Error: fmt::Display,
{
    let (columns, rows) = query::dimensions(&Puzzle::new());
    let board = BoardPresentation::new(columns, rows, settings.cell_size)
        .context("invalid board geometry")?;
    let mut session = Session::new(store, board, settings.show_labels);

    if let Some(script) = &cli.moves {
        let moves = script::parse_moves(script)?;
        session.play_script(&moves);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if cli.json {
            serde_json::to_writer_pretty(&mut out, &session.snapshot())
                .context("failed to encode snapshot")?;
            writeln!(out).context("failed to write output")?;
        } else {
            write!(out, "{}", render_text(&session.scene())).context("failed to write board")?;
        }
        return Ok(());
    }

    let presentation = Presentation::new(
        WELCOME_BANNER,
        Color::from_rgb_u8(250, 246, 238),
        session.scene(),
    );
    let stdin = io::stdin();
    TerminalBackend::new(stdin.lock(), io::stdout()).run(presentation, |frame, scene| {
        session.update(frame);
        *scene = session.scene();
    })
}
