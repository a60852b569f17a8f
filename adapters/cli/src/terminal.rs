//! Line-oriented text backend.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use glam::Vec2;
use hakoiri_core::{CellCoord, Direction, PieceId, PieceKind};
use hakoiri_rendering::{FrameInput, KeyPress, Presentation, RenderingBackend, Scene};

const HELP: &str = "commands: up/down/left/right (or w/a/s/d), esc, select <id>, \
click <x> <y>, drag <x0> <y0> <x1> <y1>, reset, quit";

/// Backend that reads commands from `reader` and draws the board as text.
#[derive(Debug)]
pub(crate) struct TerminalBackend<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> TerminalBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    pub(crate) const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R, W> RenderingBackend for TerminalBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene),
    {
        let mut scene = presentation.scene;
        writeln!(self.writer, "{}", presentation.window_title).context("failed to write title")?;
        writeln!(self.writer, "{HELP}").context("failed to write help")?;
        self.draw(&scene)?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .context("failed to read command")?;
            if read == 0 {
                break;
            }

            match parse_line(&line, &scene) {
                Ok(TerminalCommand::Quit) => break,
                Ok(TerminalCommand::Frame(frame)) => {
                    update_scene(frame, &mut scene);
                    self.draw(&scene)?;
                }
                Err(hint) => writeln!(self.writer, "{hint}").context("failed to write hint")?,
            }
        }

        self.writer.flush().context("failed to flush output")
    }
}

impl<R, W: Write> TerminalBackend<R, W> {
    fn draw(&mut self, scene: &Scene) -> Result<()> {
        write!(self.writer, "{}", render_text(scene)).context("failed to draw board")?;
        self.writer.flush().context("failed to flush output")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TerminalCommand {
    Frame(FrameInput),
    Quit,
}

fn parse_line(line: &str, scene: &Scene) -> Result<TerminalCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(HELP.to_owned());
    };
    let arguments: Vec<&str> = words.collect();

    let key = |key: KeyPress| -> Result<TerminalCommand, String> {
        Ok(TerminalCommand::Frame(FrameInput {
            key: Some(key),
            ..FrameInput::default()
        }))
    };

    match (verb.to_ascii_lowercase().as_str(), arguments.as_slice()) {
        ("quit" | "q" | "exit", []) => Ok(TerminalCommand::Quit),
        ("reset", []) => Ok(TerminalCommand::Frame(FrameInput {
            reset: true,
            ..FrameInput::default()
        })),
        ("esc" | "escape", []) => key(KeyPress::Escape),
        ("up" | "w", []) => key(KeyPress::Arrow(Direction::Up)),
        ("down" | "s", []) => key(KeyPress::Arrow(Direction::Down)),
        ("left" | "a", []) => key(KeyPress::Arrow(Direction::Left)),
        ("right" | "d", []) => key(KeyPress::Arrow(Direction::Right)),
        ("select", [id]) => {
            let id: u32 = id
                .parse()
                .map_err(|_| format!("`{id}` is not a piece number"))?;
            let piece = scene
                .piece(PieceId::new(id))
                .ok_or_else(|| format!("no piece numbered {id}"))?;
            Ok(tap(scene.board.region_center(piece.region)))
        }
        ("click", [x, y]) => Ok(tap(parse_point(x, y)?)),
        ("drag", [x0, y0, x1, y1]) => Ok(TerminalCommand::Frame(FrameInput {
            pointer_pressed: Some(parse_point(x0, y0)?),
            pointer_released: Some(parse_point(x1, y1)?),
            ..FrameInput::default()
        })),
        _ => Err(format!("unrecognised command `{}`; {HELP}", line.trim())),
    }
}

fn tap(point: Vec2) -> TerminalCommand {
    TerminalCommand::Frame(FrameInput {
        pointer_pressed: Some(point),
        pointer_released: Some(point),
        ..FrameInput::default()
    })
}

fn parse_point(x: &str, y: &str) -> Result<Vec2, String> {
    let parse = |value: &str| {
        value
            .parse::<f32>()
            .map_err(|_| format!("`{value}` is not a pixel coordinate"))
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}

/// Draws the scene as a grid of two-character cells followed by a status line.
pub(crate) fn render_text(scene: &Scene) -> String {
    let mut text = String::new();
    for row in 0..scene.board.rows {
        for column in 0..scene.board.columns {
            let cell = CellCoord::new(column, row);
            // Later pieces are drawn on top.
            let piece = scene
                .pieces
                .iter()
                .rev()
                .find(|piece| piece.region.contains(cell));
            let glyph = match piece {
                None => " .".to_owned(),
                Some(piece) => match piece.kind {
                    PieceKind::Wall => "##".to_owned(),
                    PieceKind::Exit => "==".to_owned(),
                    PieceKind::Movable | PieceKind::Target => format!("{:>2}", piece.id.get()),
                },
            };
            text.push_str(&glyph);
            text.push(if piece.map_or(false, |piece| piece.selected) {
                '*'
            } else {
                ' '
            });
        }
        text.push('\n');
    }

    let best = scene
        .best_score
        .map_or_else(|| "--".to_owned(), |best| best.to_string());
    text.push_str(&format!("moves: {}  best: {best}\n", scene.move_count));

    if let Some(selected) = scene.selected.and_then(|id| scene.piece(id)) {
        let moves: Vec<String> = scene
            .selected_moves
            .iter()
            .map(ToString::to_string)
            .collect();
        let moves = if moves.is_empty() {
            "none".to_owned()
        } else {
            moves.join(", ")
        };
        text.push_str(&format!(
            "selected: {} ({}), can move: {moves}\n",
            selected.id.get(),
            selected.label
        ));
    }

    if scene.show_labels {
        for piece in scene
            .pieces
            .iter()
            .filter(|piece| piece.kind.is_movable())
        {
            text.push_str(&format!("{:>3} {}\n", piece.id.get(), piece.label));
        }
    }

    if scene.won {
        text.push_str(&format!("solved in {} moves!\n", scene.move_count));
    }
    text
}
