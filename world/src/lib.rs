#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative puzzle state management for Hakoiri.
//!
//! A [`Puzzle`] owns the piece list, the derived board, the move counter and
//! the win flag. It is mutated only through [`apply`] (or the thin
//! [`Puzzle::attempt_move`], [`Puzzle::move_toward`] and [`Puzzle::reset`]
//! wrappers) and observed through the [`query`] module.

mod board;
mod layout;
mod rules;

use hakoiri_core::{
    CellRect, Command, Direction, Event, MoveRejection, PieceId, PieceKind, PieceSnapshot,
};
use tracing::{debug, info};

use crate::board::Board;
pub use crate::layout::{Layout, LayoutError, PieceSpec, Roles, MAX_GRID_CELLS};

/// Represents the authoritative puzzle state for a single session.
#[derive(Clone, Debug)]
pub struct Puzzle {
    layout: Layout,
    roles: Roles,
    pieces: Vec<Piece>,
    board: Board,
    move_count: u32,
    won: bool,
    selected: Option<PieceId>,
}

impl Puzzle {
    /// Creates a puzzle set up with the classic starting layout.
    #[must_use]
    pub fn new() -> Self {
        Self::install(Layout::hakoiri(), Roles::hakoiri())
    }

    /// Creates a puzzle from a custom layout after validating it.
    pub fn from_layout(layout: Layout) -> Result<Self, LayoutError> {
        let roles = layout.validate()?;
        Ok(Self::install(layout, roles))
    }

    fn install(layout: Layout, roles: Roles) -> Self {
        let pieces: Vec<Piece> = layout.pieces().iter().map(Piece::from_spec).collect();
        let mut board = Board::new(layout.columns(), layout.rows());
        board.rebuild(&pieces);
        Self {
            layout,
            roles,
            pieces,
            board,
            move_count: 0,
            won: false,
            selected: None,
        }
    }

    /// Slides a piece by one cell, returning whether the move occurred.
    pub fn attempt_move(
        &mut self,
        piece: PieceId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(index) = self.piece_index(piece) else {
            debug!(piece = piece.get(), %direction, "move rejected: unknown piece");
            out_events.push(Event::MoveRejected {
                piece,
                direction,
                reason: MoveRejection::UnknownPiece,
            });
            return false;
        };

        let from = self.pieces[index].region.origin();
        let to = match rules::check_move(self, &self.pieces[index], direction) {
            Ok(to) => to,
            Err(reason) => {
                debug!(piece = piece.get(), %direction, %reason, "move rejected");
                out_events.push(Event::MoveRejected {
                    piece,
                    direction,
                    reason,
                });
                return false;
            }
        };

        let moved = &mut self.pieces[index];
        moved.region = moved.region.with_origin(to);
        self.board.rebuild(&self.pieces);
        self.move_count = self.move_count.saturating_add(1);
        debug!(
            piece = piece.get(),
            %direction,
            column = to.column(),
            row = to.row(),
            move_count = self.move_count,
            "piece moved"
        );
        out_events.push(Event::PieceMoved {
            piece,
            direction,
            from,
            to,
            move_count: self.move_count,
        });

        if !self.won && query::is_won(self) {
            self.won = true;
            info!(move_count = self.move_count, "puzzle solved");
            out_events.push(Event::PuzzleSolved {
                move_count: self.move_count,
            });
        }

        true
    }

    /// Takes at most one step toward `(column, row)` along the dominant axis.
    pub fn move_toward(
        &mut self,
        piece: PieceId,
        column: i32,
        row: i32,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(origin) = self
            .piece_index(piece)
            .map(|index| self.pieces[index].region.origin())
        else {
            debug!(piece = piece.get(), "move toward ignored: unknown piece");
            return false;
        };
        let direction = rules::direction_toward(origin, column, row);
        self.attempt_move(piece, direction, out_events)
    }

    /// Reinstalls the starting layout, clearing the counter, win flag and selection.
    pub fn reset(&mut self, out_events: &mut Vec<Event>) {
        let layout = self.layout.clone();
        *self = Self::install(layout, self.roles);
        info!("puzzle reset");
        out_events.push(Event::PuzzleReset);
    }

    fn select(&mut self, piece: Option<PieceId>, out_events: &mut Vec<Event>) {
        if let Some(id) = piece {
            let selectable = self
                .piece_index(id)
                .map_or(false, |index| self.pieces[index].kind.is_movable());
            if !selectable {
                debug!(piece = id.get(), "selection ignored");
                return;
            }
        }
        if self.selected == piece {
            return;
        }
        self.selected = piece;
        out_events.push(Event::SelectionChanged { piece });
    }

    fn piece_index(&self, piece: PieceId) -> Option<usize> {
        self.pieces.iter().position(|candidate| candidate.id == piece)
    }

    fn piece_ref(&self, piece: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|candidate| candidate.id == piece)
    }
}

impl Default for Puzzle {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the puzzle, mutating state deterministically.
pub fn apply(puzzle: &mut Puzzle, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovePiece { piece, direction } => {
            let _ = puzzle.attempt_move(piece, direction, out_events);
        }
        Command::MoveToward { piece, column, row } => {
            let _ = puzzle.move_toward(piece, column, row, out_events);
        }
        Command::SelectPiece { piece } => puzzle.select(Some(piece), out_events),
        Command::ClearSelection => puzzle.select(None, out_events),
        Command::Reset => puzzle.reset(out_events),
    }
}

/// Query functions that provide read-only access to the puzzle state.
pub mod query {
    use hakoiri_core::{
        BoardView, CellCoord, Direction, MoveRejection, PieceId, PieceSnapshot, PuzzleSnapshot,
    };

    use super::{rules, Puzzle};

    /// Reports whether `piece` may slide one cell in `direction`.
    #[must_use]
    pub fn can_move(puzzle: &Puzzle, piece: PieceId, direction: Direction) -> bool {
        check_move(puzzle, piece, direction).is_ok()
    }

    /// Explains why a move would be rejected, or returns the destination origin.
    pub fn check_move(
        puzzle: &Puzzle,
        piece: PieceId,
        direction: Direction,
    ) -> Result<CellCoord, MoveRejection> {
        let piece = puzzle
            .piece_ref(piece)
            .ok_or(MoveRejection::UnknownPiece)?;
        rules::check_move(puzzle, piece, direction)
    }

    /// Lists the directions in which `piece` can currently move.
    #[must_use]
    pub fn possible_moves(puzzle: &Puzzle, piece: PieceId) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|direction| can_move(puzzle, piece, *direction))
            .collect()
    }

    /// Reports whether the target piece sits at the exit entry.
    #[must_use]
    pub fn is_won(puzzle: &Puzzle) -> bool {
        puzzle
            .piece_ref(puzzle.roles.target)
            .map_or(false, |target| target.region.origin() == puzzle.roles.exit_entry)
    }

    /// Resolves a pixel position to the piece drawn there.
    ///
    /// Pixels are mapped to cells by floor division with `cell_size`.
    /// Negative or non-finite coordinates, positions beyond the grid and
    /// non-positive cell sizes all report `None`.
    #[must_use]
    pub fn piece_at(puzzle: &Puzzle, x: f32, y: f32, cell_size: f32) -> Option<PieceSnapshot> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return None;
        }
        let column = pixel_to_index(x, cell_size)?;
        let row = pixel_to_index(y, cell_size)?;
        piece_in_cell(puzzle, CellCoord::new(column, row))
    }

    fn pixel_to_index(value: f32, cell_size: f32) -> Option<u32> {
        let index = (value / cell_size).floor();
        if !index.is_finite() || index < 0.0 || index > u32::MAX as f32 {
            return None;
        }
        Some(index as u32)
    }

    /// Returns the piece covering the provided cell, if any.
    #[must_use]
    pub fn piece_in_cell(puzzle: &Puzzle, cell: CellCoord) -> Option<PieceSnapshot> {
        puzzle
            .board
            .occupant(cell)
            .and_then(|id| piece(puzzle, id))
    }

    /// Captures a single piece by identifier.
    #[must_use]
    pub fn piece(puzzle: &Puzzle, id: PieceId) -> Option<PieceSnapshot> {
        puzzle.piece_ref(id).map(|piece| piece.snapshot())
    }

    /// Captures every piece in insertion order.
    #[must_use]
    pub fn pieces(puzzle: &Puzzle) -> Vec<PieceSnapshot> {
        puzzle.pieces.iter().map(|piece| piece.snapshot()).collect()
    }

    /// Number of moves applied since the last reset.
    #[must_use]
    pub fn move_count(puzzle: &Puzzle) -> u32 {
        puzzle.move_count
    }

    /// Piece currently selected by the player, if any.
    #[must_use]
    pub fn selected_piece(puzzle: &Puzzle) -> Option<PieceId> {
        puzzle.selected
    }

    /// Origin the target piece must reach to win.
    #[must_use]
    pub fn exit_entry(puzzle: &Puzzle) -> CellCoord {
        puzzle.roles.exit_entry
    }

    /// Identifier of the target piece.
    #[must_use]
    pub fn target_piece(puzzle: &Puzzle) -> PieceId {
        puzzle.roles.target
    }

    /// Column and row counts of the grid.
    #[must_use]
    pub fn dimensions(puzzle: &Puzzle) -> (u32, u32) {
        puzzle.board.dimensions()
    }

    /// Exposes a read-only view of the board occupancy.
    #[must_use]
    pub fn board_view(puzzle: &Puzzle) -> BoardView<'_> {
        puzzle.board.view()
    }

    /// Copies the whole state into an owned snapshot.
    #[must_use]
    pub fn snapshot(puzzle: &Puzzle) -> PuzzleSnapshot {
        let (columns, rows) = puzzle.board.dimensions();
        PuzzleSnapshot {
            pieces: pieces(puzzle),
            columns,
            rows,
            cells: puzzle.board.cells().to_vec(),
            move_count: puzzle.move_count,
            won: puzzle.won,
            selected: puzzle.selected,
        }
    }
}

#[derive(Clone, Debug)]
struct Piece {
    id: PieceId,
    kind: PieceKind,
    region: CellRect,
    label: String,
}

impl Piece {
    fn from_spec(spec: &PieceSpec) -> Self {
        Self {
            id: spec.id,
            kind: spec.kind,
            region: spec.region,
            label: spec.label.clone(),
        }
    }

    fn snapshot(&self) -> PieceSnapshot {
        PieceSnapshot {
            id: self.id,
            kind: self.kind,
            region: self.region,
            label: self.label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hakoiri_core::CellCoord;

    fn id(value: u32) -> PieceId {
        PieceId::new(value)
    }

    #[test]
    fn new_puzzle_starts_unsolved_with_zero_moves() {
        let puzzle = Puzzle::new();
        assert_eq!(query::move_count(&puzzle), 0);
        assert!(!query::is_won(&puzzle));
        assert_eq!(query::selected_piece(&puzzle), None);
        assert_eq!(query::pieces(&puzzle).len(), 17);
        assert_eq!(query::exit_entry(&puzzle), CellCoord::new(2, 4));
    }

    #[test]
    fn oversized_custom_layout_is_refused_without_allocating() {
        let layout = Layout::new(u32::MAX, u32::MAX)
            .with_piece(PieceSpec::new(1, PieceKind::Target, (2, 2), (3, 0), "Daughter"))
            .with_piece(PieceSpec::new(17, PieceKind::Exit, (2, 1), (2, 5), "Exit"));

        let error = Puzzle::from_layout(layout).expect_err("grid exceeds the cell limit");
        assert_eq!(
            error,
            LayoutError::GridTooLarge {
                columns: u32::MAX,
                rows: u32::MAX
            }
        );
    }

    #[test]
    fn classic_target_is_the_daughter() {
        let puzzle = Puzzle::new();
        let target = query::target_piece(&puzzle);
        assert_eq!(target, id(1));
        let daughter = query::piece(&puzzle, target).expect("target piece exists");
        assert_eq!(daughter.kind, PieceKind::Target);
    }

    #[test]
    fn only_the_corner_pieces_can_move_at_start() {
        let puzzle = Puzzle::new();
        let movable: Vec<_> = query::pieces(&puzzle)
            .into_iter()
            .filter(|piece| !query::possible_moves(&puzzle, piece.id).is_empty())
            .map(|piece| (piece.id.get(), query::possible_moves(&puzzle, piece.id)))
            .collect();

        assert_eq!(
            movable,
            vec![
                (2, vec![Direction::Left]),
                (4, vec![Direction::Up]),
            ]
        );
    }

    #[test]
    fn successful_move_updates_board_and_counter() {
        let mut puzzle = Puzzle::new();
        let mut events = Vec::new();

        assert!(puzzle.attempt_move(id(4), Direction::Up, &mut events));

        assert_eq!(
            events,
            vec![Event::PieceMoved {
                piece: id(4),
                direction: Direction::Up,
                from: CellCoord::new(0, 2),
                to: CellCoord::new(0, 1),
                move_count: 1,
            }]
        );
        let view = query::board_view(&puzzle);
        assert_eq!(view.occupant(CellCoord::new(0, 1)), Some(id(4)));
        assert!(view.is_free(CellCoord::new(0, 2)));
    }

    #[test]
    fn rejected_move_changes_nothing() {
        let mut puzzle = Puzzle::new();
        let before = query::snapshot(&puzzle);
        let mut events = Vec::new();

        assert!(!puzzle.attempt_move(id(1), Direction::Left, &mut events));

        assert_eq!(query::snapshot(&puzzle), before);
        assert_eq!(
            events,
            vec![Event::MoveRejected {
                piece: id(1),
                direction: Direction::Left,
                reason: MoveRejection::Blocked { occupant: id(2) },
            }]
        );
    }

    #[test]
    fn walls_and_exit_are_immovable() {
        let puzzle = Puzzle::new();
        for piece in [15, 16, 17] {
            for direction in Direction::ALL {
                assert_eq!(
                    query::check_move(&puzzle, id(piece), direction),
                    Err(MoveRejection::Immovable)
                );
            }
        }
    }

    #[test]
    fn unknown_piece_is_a_no_op() {
        let mut puzzle = Puzzle::new();
        let mut events = Vec::new();

        assert!(!puzzle.attempt_move(id(99), Direction::Up, &mut events));
        assert!(!puzzle.move_toward(id(99), 0, 0, &mut events));

        assert_eq!(query::move_count(&puzzle), 0);
        assert_eq!(
            events,
            vec![Event::MoveRejected {
                piece: id(99),
                direction: Direction::Up,
                reason: MoveRejection::UnknownPiece,
            }]
        );
        assert_eq!(query::piece(&puzzle, id(99)), None);
        assert!(query::possible_moves(&puzzle, id(99)).is_empty());
    }

    #[test]
    fn move_toward_takes_a_single_step() {
        let mut puzzle = Puzzle::new();
        let mut events = Vec::new();

        assert!(puzzle.move_toward(id(2), -5, 1, &mut events));

        let father = query::piece(&puzzle, id(2)).expect("father exists");
        assert_eq!(father.region.origin(), CellCoord::new(1, 0));
        assert_eq!(query::move_count(&puzzle), 1);
    }

    #[test]
    fn selection_accepts_only_movable_pieces() {
        let mut puzzle = Puzzle::new();
        let mut events = Vec::new();

        apply(&mut puzzle, Command::SelectPiece { piece: id(15) }, &mut events);
        apply(&mut puzzle, Command::SelectPiece { piece: id(42) }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::selected_piece(&puzzle), None);

        apply(&mut puzzle, Command::SelectPiece { piece: id(1) }, &mut events);
        apply(&mut puzzle, Command::SelectPiece { piece: id(1) }, &mut events);
        apply(&mut puzzle, Command::ClearSelection, &mut events);

        assert_eq!(
            events,
            vec![
                Event::SelectionChanged { piece: Some(id(1)) },
                Event::SelectionChanged { piece: None },
            ]
        );
    }

    #[test]
    fn reset_restores_layout_and_clears_state() {
        let mut puzzle = Puzzle::new();
        let initial = query::snapshot(&puzzle);
        let mut events = Vec::new();

        apply(&mut puzzle, Command::SelectPiece { piece: id(2) }, &mut events);
        assert!(puzzle.attempt_move(id(2), Direction::Left, &mut events));
        events.clear();

        apply(&mut puzzle, Command::Reset, &mut events);

        assert_eq!(events, vec![Event::PuzzleReset]);
        assert_eq!(query::snapshot(&puzzle), initial);
    }

    #[test]
    fn piece_at_uses_floor_division() {
        let puzzle = Puzzle::new();

        let father = query::piece_at(&puzzle, 160.0, 0.0, 80.0).expect("piece at boundary");
        assert_eq!(father.id, id(2));
        let left_of_boundary = query::piece_at(&puzzle, 159.99, 0.0, 80.0);
        assert_eq!(left_of_boundary, None);
        let daughter = query::piece_at(&puzzle, 240.0, 79.5, 80.0).expect("daughter");
        assert_eq!(daughter.id, id(1));
    }

    #[test]
    fn piece_at_rejects_points_outside_grid() {
        let puzzle = Puzzle::new();
        assert_eq!(query::piece_at(&puzzle, -0.5, 10.0, 80.0), None);
        assert_eq!(query::piece_at(&puzzle, 10.0, 480.0, 80.0), None);
        assert_eq!(query::piece_at(&puzzle, f32::NAN, 10.0, 80.0), None);
        assert_eq!(query::piece_at(&puzzle, 10.0, 10.0, 0.0), None);
        assert_eq!(query::piece_at(&puzzle, 10.0, 10.0, -80.0), None);
    }
}
