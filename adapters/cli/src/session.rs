//! Glue that drives the puzzle, input and score systems for one player.

use std::fmt;

use hakoiri_core::{Command, Event, PuzzleSnapshot};
use hakoiri_rendering::{BoardPresentation, FrameInput, KeyPress, Palette, Scene};
use hakoiri_system_input::{drag_piece, Input, InputFrame, Key};
use hakoiri_system_score::{ScoreKeeper, ScoreStore};
use hakoiri_world::{self as world, query, Puzzle};
use tracing::{debug, info, warn};

use crate::script::ScriptedMove;

/// Owns the puzzle together with the systems reacting to it.
#[derive(Debug)]
pub(crate) struct Session<S> {
    puzzle: Puzzle,
    input: Input,
    keeper: ScoreKeeper<S>,
    board: BoardPresentation,
    palette: Palette,
    show_labels: bool,
    last_events: Vec<Event>,
}

impl<S> Session<S>
where
    S: ScoreStore,
    S::Error: fmt::Display,
{
    pub(crate) fn new(store: S, board: BoardPresentation, show_labels: bool) -> Self {
        Self {
            puzzle: Puzzle::new(),
            input: Input::new(),
            keeper: ScoreKeeper::new(store),
            board,
            palette: Palette::default(),
            show_labels,
            last_events: Vec::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> PuzzleSnapshot {
        query::snapshot(&self.puzzle)
    }

    pub(crate) fn scene(&self) -> Scene {
        let selected_moves = query::selected_piece(&self.puzzle)
            .map(|piece| query::possible_moves(&self.puzzle, piece))
            .unwrap_or_default();
        let mut scene = Scene::from_snapshot(
            self.board,
            &self.snapshot(),
            &self.palette,
            self.keeper.best(),
            selected_moves,
        );
        scene.show_labels = self.show_labels;
        scene
    }

    /// Applies scripted moves in order, continuing past rejected ones.
    pub(crate) fn play_script(&mut self, moves: &[ScriptedMove]) {
        let mut events = Vec::new();
        for scripted in moves {
            world::apply(
                &mut self.puzzle,
                Command::MovePiece {
                    piece: scripted.piece,
                    direction: scripted.direction,
                },
                &mut events,
            );
        }
        self.finish_step(events);
    }

    /// Advances the session by one frame of player input.
    pub(crate) fn update(&mut self, frame: FrameInput) {
        let mut events = Vec::new();
        if frame.reset {
            world::apply(&mut self.puzzle, Command::Reset, &mut events);
        }

        let mut commands = Vec::new();
        let cell_size = self.board.cell_size;
        let input_frame = InputFrame {
            key: frame.key.map(|key| match key {
                KeyPress::Arrow(direction) => Key::Arrow(direction),
                KeyPress::Escape => Key::Escape,
            }),
            pointer_pressed: frame.pointer_pressed,
            pointer_released: frame.pointer_released,
            cell_size,
        };
        let puzzle = &self.puzzle;
        let seen: Vec<Event> = self.last_events.iter().chain(&events).cloned().collect();
        let drag = self.input.handle(
            &seen,
            input_frame,
            |point| query::piece_at(puzzle, point.x, point.y, cell_size),
            &mut commands,
        );

        for command in commands {
            debug!(?command, "applying input command");
            world::apply(&mut self.puzzle, command, &mut events);
        }

        if let Some(request) = drag {
            let puzzle = &mut self.puzzle;
            let steps = drag_piece(request.from, request.to, |direction| {
                puzzle.attempt_move(request.piece, direction, &mut events)
            });
            debug!(piece = request.piece.get(), steps, "drag resolved");
        }

        self.finish_step(events);
    }

    fn finish_step(&mut self, events: Vec<Event>) {
        for event in &events {
            match event {
                Event::MoveRejected {
                    piece,
                    direction,
                    reason,
                } => warn!(piece = piece.get(), %direction, %reason, "move rejected"),
                Event::PuzzleSolved { move_count } => info!(move_count, "puzzle solved"),
                _ => {}
            }
        }

        let mut records = Vec::new();
        if let Err(error) = self.keeper.handle(&events, &mut records) {
            warn!(%error, "failed to save best score");
        }
        for record in &records {
            if let Event::BestScoreImproved {
                move_count,
                previous,
            } = record
            {
                info!(move_count, ?previous, "new best score");
            }
        }

        self.last_events = events;
        self.last_events.extend(records);
    }
}
