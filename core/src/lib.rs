#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hakoiri puzzle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative puzzle, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable snapshots, and
//! respond exclusively with new command batches.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Hakoiri. Slide the daughter out through the exit.";

/// Commands that express all permissible puzzle mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a piece slide a single cell in the provided direction.
    MovePiece {
        /// Identifier of the piece attempting to move.
        piece: PieceId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests a single step of the piece toward an arbitrary grid cell.
    ///
    /// The coordinates are signed because pointer-derived targets may lie
    /// outside the grid.
    MoveToward {
        /// Identifier of the piece attempting to move.
        piece: PieceId,
        /// Column the piece's origin should approach.
        column: i32,
        /// Row the piece's origin should approach.
        row: i32,
    },
    /// Marks a piece as the current selection.
    SelectPiece {
        /// Identifier of the piece to select.
        piece: PieceId,
    },
    /// Clears the current selection.
    ClearSelection,
    /// Discards the current puzzle and reinstalls the starting layout.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a piece moved by one cell.
    PieceMoved {
        /// Identifier of the piece that moved.
        piece: PieceId,
        /// Direction the piece travelled.
        direction: Direction,
        /// Origin occupied before the move.
        from: CellCoord,
        /// Origin occupied after the move.
        to: CellCoord,
        /// Move counter after the move was applied.
        move_count: u32,
    },
    /// Reports that a move request was refused. No state changed.
    MoveRejected {
        /// Identifier supplied with the request.
        piece: PieceId,
        /// Direction supplied with the request.
        direction: Direction,
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Announces that the target piece reached the exit.
    ///
    /// Emitted exactly once per win; a further win requires a reset first.
    PuzzleSolved {
        /// Final number of moves taken to solve the puzzle.
        move_count: u32,
    },
    /// Announces that the puzzle returned to its starting layout.
    PuzzleReset,
    /// Announces a change to the selected piece.
    SelectionChanged {
        /// Newly selected piece, or `None` when the selection was cleared.
        piece: Option<PieceId>,
    },
    /// Reports that a solve beat the stored best score.
    BestScoreImproved {
        /// Move count that became the new best.
        move_count: u32,
        /// Best move count stored before this solve, if any.
        previous: Option<u32>,
    },
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// No piece with the provided identifier exists.
    UnknownPiece,
    /// Walls and the exit marker never move.
    Immovable,
    /// The puzzle is already solved; only a reset unlocks further moves.
    PuzzleSolved,
    /// The translated footprint would leave the grid.
    OutOfBounds,
    /// The translated footprint overlaps another piece.
    Blocked {
        /// Piece occupying the first conflicting cell.
        occupant: PieceId,
    },
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPiece => write!(f, "no such piece"),
            Self::Immovable => write!(f, "piece cannot move"),
            Self::PuzzleSolved => write!(f, "puzzle already solved"),
            Self::OutOfBounds => write!(f, "move leaves the board"),
            Self::Blocked { occupant } => write!(f, "blocked by piece {}", occupant.get()),
        }
    }
}

/// Cardinal directions a piece can slide in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction, in the order affordances are reported.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Column and row delta of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Resolves a unit offset into a direction.
    ///
    /// Diagonal, zero and multi-cell offsets yield `None`.
    #[must_use]
    pub const fn from_unit_offset(column_delta: i32, row_delta: i32) -> Option<Self> {
        match (column_delta, row_delta) {
            (0, -1) => Some(Self::Up),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(ParseDirectionError {
                token: token.to_owned(),
            }),
        }
    }
}

/// Error returned when a direction token is not one of the four cardinals.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown direction `{token}`; expected up, down, left or right")]
pub struct ParseDirectionError {
    token: String,
}

impl ParseDirectionError {
    /// Token that failed to parse.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Unique identifier assigned to a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates a new piece identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Role a piece plays in the puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// Ordinary piece that slides freely.
    Movable,
    /// The piece that must reach the exit to win.
    Target,
    /// Fixed obstacle.
    Wall,
    /// Fixed exit slot; passable for the target piece only.
    Exit,
}

impl PieceKind {
    /// Reports whether pieces of this kind may ever change position.
    #[must_use]
    pub const fn is_movable(self) -> bool {
        match self {
            Self::Movable | Self::Target => true,
            Self::Wall | Self::Exit => false,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in the provided direction.
    ///
    /// Stepping past column or row zero yields `None`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (column_delta, row_delta) = direction.offset();
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        Some(CellCoord::new(column, row))
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Returns the same footprint anchored at a different origin.
    #[must_use]
    pub const fn with_origin(self, origin: CellCoord) -> Self {
        Self {
            origin,
            size: self.size,
        }
    }

    /// Reports whether the whole rectangle lies inside a grid of the given size.
    #[must_use]
    pub fn fits_within(&self, columns: u32, rows: u32) -> bool {
        let right = u64::from(self.origin.column()) + u64::from(self.size.width());
        let bottom = u64::from(self.origin.row()) + u64::from(self.size.height());
        right <= u64::from(columns) && bottom <= u64::from(rows)
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        let left = u64::from(self.origin.column());
        let top = u64::from(self.origin.row());
        column >= left
            && row >= top
            && column < left + u64::from(self.size.width())
            && row < top + u64::from(self.size.height())
    }

    /// Iterates over every covered cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = self.size.width();
        (0..self.size.height()).flat_map(move |row_offset| {
            (0..width).filter_map(move |column_offset| {
                let column = origin.column().checked_add(column_offset)?;
                let row = origin.row().checked_add(row_offset)?;
                Some(CellCoord::new(column, row))
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Immutable representation of a single piece used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    /// Unique identifier assigned to the piece.
    pub id: PieceId,
    /// Role of the piece.
    pub kind: PieceKind,
    /// Cells currently covered by the piece.
    pub region: CellRect,
    /// Display-only text associated with the piece.
    pub label: String,
}

/// Owned copy of the whole puzzle state, safe to keep across mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSnapshot {
    /// Pieces in their stable insertion order.
    pub pieces: Vec<PieceSnapshot>,
    /// Number of board columns.
    pub columns: u32,
    /// Number of board rows.
    pub rows: u32,
    /// Row-major copy of the board occupancy.
    pub cells: Vec<Option<PieceId>>,
    /// Number of moves applied since the last reset.
    pub move_count: u32,
    /// Whether the target piece reached the exit.
    pub won: bool,
    /// Piece currently selected by the player, if any.
    pub selected: Option<PieceId>,
}

impl PuzzleSnapshot {
    /// Returns the piece recorded as occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<PieceId> {
        BoardView::new(&self.cells, self.columns, self.rows).occupant(cell)
    }

    /// Looks up a captured piece by identifier.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&PieceSnapshot> {
        self.pieces.iter().find(|piece| piece.id == id)
    }
}

/// Read-only view into the dense board occupancy.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [Option<PieceId>],
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<PieceId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the piece occupying the provided cell, if any.
    ///
    /// Cells outside the grid report `None`.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<PieceId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies inside the grid and is unoccupied.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| matches!(self.cells.get(index), Some(None)))
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<PieceId>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
