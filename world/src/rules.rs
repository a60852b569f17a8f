//! Move legality.

use hakoiri_core::{CellCoord, Direction, MoveRejection, PieceKind};

use crate::{Piece, Puzzle};

/// Decides whether `piece` may slide one cell in `direction`.
///
/// Returns the origin the piece would occupy after the move.
pub(crate) fn check_move(
    puzzle: &Puzzle,
    piece: &Piece,
    direction: Direction,
) -> Result<CellCoord, MoveRejection> {
    if !piece.kind.is_movable() {
        return Err(MoveRejection::Immovable);
    }
    if puzzle.won {
        return Err(MoveRejection::PuzzleSolved);
    }

    let candidate = piece
        .region
        .origin()
        .step(direction)
        .ok_or(MoveRejection::OutOfBounds)?;
    let translated = piece.region.with_origin(candidate);
    let (columns, rows) = puzzle.board.dimensions();
    if !translated.fits_within(columns, rows) {
        return Err(MoveRejection::OutOfBounds);
    }

    let is_target = piece.kind == PieceKind::Target;
    if is_target && candidate == puzzle.roles.exit_entry {
        return Ok(candidate);
    }

    for cell in translated.cells() {
        let Some(occupant) = puzzle.board.occupant(cell) else {
            continue;
        };
        if occupant == piece.id {
            continue;
        }
        // The exit slot is permeable to the target only.
        if is_target && occupant == puzzle.roles.exit {
            continue;
        }
        return Err(MoveRejection::Blocked { occupant });
    }

    Ok(candidate)
}

/// Collapses a two-dimensional offset into the single cardinal step that
/// reduces the dominant axis. Ties and zero offsets resolve vertically.
pub(crate) fn direction_toward(origin: CellCoord, column: i32, row: i32) -> Direction {
    let column_delta = i64::from(column) - i64::from(origin.column());
    let row_delta = i64::from(row) - i64::from(origin.row());

    if column_delta.abs() > row_delta.abs() {
        if column_delta > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if row_delta > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}
