//! Starting layouts and their validation.

use std::collections::BTreeSet;

use hakoiri_core::{CellCoord, CellRect, CellRectSize, PieceId, PieceKind};
use thiserror::Error;

const HAKOIRI_COLUMNS: u32 = 6;
const HAKOIRI_ROWS: u32 = 6;

/// Identifier of the target piece in the classic layout.
pub(crate) const HAKOIRI_TARGET: PieceId = PieceId::new(1);
/// Identifier of the exit marker in the classic layout.
pub(crate) const HAKOIRI_EXIT: PieceId = PieceId::new(17);
/// Origin the target piece must reach in the classic layout.
pub(crate) const HAKOIRI_EXIT_ENTRY: CellCoord = CellCoord::new(2, 4);

/// Largest number of cells a layout grid may contain.
pub const MAX_GRID_CELLS: u64 = 1 << 16;

/// Number of cells in a `columns` x `rows` grid, or `None` when the grid
/// exceeds [`MAX_GRID_CELLS`].
pub(crate) fn grid_cells(columns: u32, rows: u32) -> Option<usize> {
    let cells = u64::from(columns).checked_mul(u64::from(rows))?;
    if cells > MAX_GRID_CELLS {
        return None;
    }
    usize::try_from(cells).ok()
}

/// Description of a single piece placed by a [`Layout`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceSpec {
    /// Identifier assigned to the piece.
    pub id: PieceId,
    /// Role the piece plays.
    pub kind: PieceKind,
    /// Footprint and starting origin.
    pub region: CellRect,
    /// Display-only text.
    pub label: String,
}

impl PieceSpec {
    /// Creates a piece description anchored at `(column, row)`.
    #[must_use]
    pub fn new(
        id: u32,
        kind: PieceKind,
        (width, height): (u32, u32),
        (column, row): (u32, u32),
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: PieceId::new(id),
            kind,
            region: CellRect::from_origin_and_size(
                CellCoord::new(column, row),
                CellRectSize::new(width, height),
            ),
            label: label.into(),
        }
    }
}

/// Grid dimensions plus the pieces placed at the start of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    columns: u32,
    rows: u32,
    pieces: Vec<PieceSpec>,
}

impl Layout {
    /// Creates an empty layout for a grid of the provided size.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            pieces: Vec::new(),
        }
    }

    /// Appends a piece to the layout.
    #[must_use]
    pub fn with_piece(mut self, piece: PieceSpec) -> Self {
        self.pieces.push(piece);
        self
    }

    /// The classic 6×6 "daughter in the box" arrangement.
    #[must_use]
    pub fn hakoiri() -> Self {
        use PieceKind::{Exit, Movable, Target, Wall};

        Self::new(HAKOIRI_COLUMNS, HAKOIRI_ROWS)
            .with_piece(PieceSpec::new(1, Target, (2, 2), (3, 0), "Daughter"))
            .with_piece(PieceSpec::new(2, Movable, (1, 2), (2, 0), "Father"))
            .with_piece(PieceSpec::new(3, Movable, (1, 2), (5, 0), "Mother"))
            .with_piece(PieceSpec::new(4, Movable, (1, 1), (0, 2), "Clerk"))
            .with_piece(PieceSpec::new(5, Movable, (4, 1), (1, 2), "Head clerk"))
            .with_piece(PieceSpec::new(6, Movable, (1, 1), (5, 2), "Sister-in-law"))
            .with_piece(PieceSpec::new(7, Movable, (1, 1), (0, 3), "Apprentice"))
            .with_piece(PieceSpec::new(8, Movable, (2, 1), (1, 3), "Maid"))
            .with_piece(PieceSpec::new(9, Movable, (2, 1), (3, 3), "Manager"))
            .with_piece(PieceSpec::new(10, Movable, (1, 1), (5, 3), "Apprentice"))
            .with_piece(PieceSpec::new(11, Movable, (1, 1), (0, 4), "Guard dog"))
            .with_piece(PieceSpec::new(12, Movable, (2, 1), (1, 4), "Grandfather"))
            .with_piece(PieceSpec::new(13, Movable, (2, 1), (3, 4), "Grandmother"))
            .with_piece(PieceSpec::new(14, Movable, (1, 1), (5, 4), "Apprentice"))
            .with_piece(PieceSpec::new(15, Wall, (2, 1), (0, 5), ""))
            .with_piece(PieceSpec::new(16, Wall, (2, 1), (4, 5), ""))
            .with_piece(PieceSpec::new(17, Exit, (2, 1), (2, 5), "Exit"))
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Pieces in insertion order.
    #[must_use]
    pub fn pieces(&self) -> &[PieceSpec] {
        &self.pieces
    }

    /// Checks every structural rule and resolves the roles the engine needs.
    pub fn validate(&self) -> Result<Roles, LayoutError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(LayoutError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if grid_cells(self.columns, self.rows).is_none() {
            return Err(LayoutError::GridTooLarge {
                columns: self.columns,
                rows: self.rows,
            });
        }

        let mut ids = BTreeSet::new();
        for piece in &self.pieces {
            if !ids.insert(piece.id) {
                return Err(LayoutError::DuplicateId {
                    piece: piece.id.get(),
                });
            }
            if piece.region.size().is_empty() {
                return Err(LayoutError::EmptyPiece {
                    piece: piece.id.get(),
                });
            }
            if !piece.region.fits_within(self.columns, self.rows) {
                return Err(LayoutError::OutOfBounds {
                    piece: piece.id.get(),
                });
            }
        }

        for (index, first) in self.pieces.iter().enumerate() {
            for second in &self.pieces[index + 1..] {
                if first.region.cells().any(|cell| second.region.contains(cell)) {
                    return Err(LayoutError::Overlap {
                        first: first.id.get(),
                        second: second.id.get(),
                    });
                }
            }
        }

        let target = self.single_of(PieceKind::Target)?;
        let exit = self.single_of(PieceKind::Exit)?;
        let exit_entry = exit_entry(self.columns, self.rows, target.region, exit.region)
            .ok_or(LayoutError::UnreachableExit)?;

        Ok(Roles {
            target: target.id,
            exit: exit.id,
            exit_entry,
        })
    }

    fn single_of(&self, kind: PieceKind) -> Result<&PieceSpec, LayoutError> {
        let mut matching = self.pieces.iter().filter(|piece| piece.kind == kind);
        let first = matching.next().ok_or(LayoutError::MissingRole { kind })?;
        if matching.next().is_some() {
            return Err(LayoutError::DuplicateRole { kind });
        }
        Ok(first)
    }
}

/// Pieces with special meaning, resolved from a validated layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roles {
    /// The piece that must reach the exit.
    pub target: PieceId,
    /// The exit marker.
    pub exit: PieceId,
    /// Origin at which the target sits centred over the exit slot.
    pub exit_entry: CellCoord,
}

impl Roles {
    pub(crate) const fn hakoiri() -> Self {
        Self {
            target: HAKOIRI_TARGET,
            exit: HAKOIRI_EXIT,
            exit_entry: HAKOIRI_EXIT_ENTRY,
        }
    }
}

/// Reasons a layout cannot be installed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The grid has no cells.
    #[error("grid must have at least one cell (received {columns}x{rows})")]
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The grid holds more than [`MAX_GRID_CELLS`] cells.
    #[error("grid of {columns}x{rows} cells exceeds the limit of {limit}", limit = MAX_GRID_CELLS)]
    GridTooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Two pieces share an identifier.
    #[error("piece id {piece} is used more than once")]
    DuplicateId {
        /// Offending identifier.
        piece: u32,
    },
    /// A piece has a zero width or height.
    #[error("piece {piece} has an empty footprint")]
    EmptyPiece {
        /// Offending identifier.
        piece: u32,
    },
    /// A piece extends past the grid.
    #[error("piece {piece} lies outside the grid")]
    OutOfBounds {
        /// Offending identifier.
        piece: u32,
    },
    /// Two footprints share at least one cell.
    #[error("pieces {first} and {second} overlap")]
    Overlap {
        /// First piece in insertion order.
        first: u32,
        /// Second piece in insertion order.
        second: u32,
    },
    /// No piece of a required kind exists.
    #[error("layout has no {kind:?} piece")]
    MissingRole {
        /// Kind that is missing.
        kind: PieceKind,
    },
    /// More than one piece of a singular kind exists.
    #[error("layout has more than one {kind:?} piece")]
    DuplicateRole {
        /// Kind that is duplicated.
        kind: PieceKind,
    },
    /// Centring the target over the exit would leave the grid.
    #[error("target piece cannot be centred over the exit inside the grid")]
    UnreachableExit,
}

/// Computes the origin that centres the target horizontally over the exit
/// slot with both bottom edges aligned.
fn exit_entry(columns: u32, rows: u32, target: CellRect, exit: CellRect) -> Option<CellCoord> {
    let target_size = target.size();
    let exit_size = exit.size();
    let column = i64::from(exit.origin().column())
        + (i64::from(exit_size.width()) - i64::from(target_size.width())) / 2;
    let row = i64::from(exit.origin().row()) + i64::from(exit_size.height())
        - i64::from(target_size.height());

    let entry = CellCoord::new(u32::try_from(column).ok()?, u32::try_from(row).ok()?);
    target
        .with_origin(entry)
        .fits_within(columns, rows)
        .then_some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Layout {
        Layout::new(6, 6)
            .with_piece(PieceSpec::new(1, PieceKind::Target, (2, 2), (3, 0), "t"))
            .with_piece(PieceSpec::new(17, PieceKind::Exit, (2, 1), (2, 5), "e"))
    }

    #[test]
    fn hakoiri_layout_matches_cached_roles() {
        let roles = Layout::hakoiri().validate().expect("classic layout is valid");
        assert_eq!(roles, Roles::hakoiri());
    }

    #[test]
    fn hakoiri_layout_leaves_four_free_cells() {
        let layout = Layout::hakoiri();
        let covered: u32 = layout
            .pieces()
            .iter()
            .map(|piece| piece.region.size().width() * piece.region.size().height())
            .sum();
        assert_eq!(layout.columns() * layout.rows() - covered, 4);
    }

    #[test]
    fn exit_entry_centres_target_over_slot() {
        let roles = minimal().validate().expect("valid");
        assert_eq!(roles.exit_entry, CellCoord::new(2, 4));
    }

    #[test]
    fn exit_entry_centres_narrow_target_inside_wide_exit() {
        let layout = Layout::new(5, 5)
            .with_piece(PieceSpec::new(1, PieceKind::Target, (1, 1), (0, 0), "t"))
            .with_piece(PieceSpec::new(2, PieceKind::Exit, (3, 1), (1, 4), "e"));
        let roles = layout.validate().expect("valid");
        assert_eq!(roles.exit_entry, CellCoord::new(2, 4));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(
            Layout::new(0, 4).validate(),
            Err(LayoutError::EmptyGrid {
                columns: 0,
                rows: 4
            })
        );
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let layout = Layout::new(u32::MAX, u32::MAX)
            .with_piece(PieceSpec::new(1, PieceKind::Target, (2, 2), (3, 0), "t"))
            .with_piece(PieceSpec::new(17, PieceKind::Exit, (2, 1), (2, 5), "e"));
        assert_eq!(
            layout.validate(),
            Err(LayoutError::GridTooLarge {
                columns: u32::MAX,
                rows: u32::MAX
            })
        );

        assert_eq!(grid_cells(256, 256), Some(65_536));
        assert_eq!(grid_cells(256, 257), None);
    }

    #[test]
    fn overlapping_pieces_are_rejected() {
        let layout =
            minimal().with_piece(PieceSpec::new(2, PieceKind::Movable, (1, 1), (4, 1), "m"));
        assert_eq!(
            layout.validate(),
            Err(LayoutError::Overlap {
                first: 1,
                second: 2
            })
        );
    }

    #[test]
    fn out_of_bounds_piece_is_rejected() {
        let layout =
            minimal().with_piece(PieceSpec::new(2, PieceKind::Movable, (2, 1), (5, 3), "m"));
        assert_eq!(layout.validate(), Err(LayoutError::OutOfBounds { piece: 2 }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let layout =
            minimal().with_piece(PieceSpec::new(1, PieceKind::Movable, (1, 1), (0, 0), "m"));
        assert_eq!(layout.validate(), Err(LayoutError::DuplicateId { piece: 1 }));
    }

    #[test]
    fn zero_sized_piece_is_rejected() {
        let layout =
            minimal().with_piece(PieceSpec::new(2, PieceKind::Movable, (0, 1), (0, 0), "m"));
        assert_eq!(layout.validate(), Err(LayoutError::EmptyPiece { piece: 2 }));
    }

    #[test]
    fn roles_must_be_unique_and_present() {
        let no_exit = Layout::new(4, 4).with_piece(PieceSpec::new(
            1,
            PieceKind::Target,
            (1, 1),
            (0, 0),
            "t",
        ));
        assert_eq!(
            no_exit.validate(),
            Err(LayoutError::MissingRole {
                kind: PieceKind::Exit
            })
        );

        let two_targets =
            minimal().with_piece(PieceSpec::new(2, PieceKind::Target, (1, 1), (0, 0), "t"));
        assert_eq!(
            two_targets.validate(),
            Err(LayoutError::DuplicateRole {
                kind: PieceKind::Target
            })
        );
    }

    #[test]
    fn exit_too_close_to_top_edge_is_unreachable() {
        let layout = Layout::new(4, 4)
            .with_piece(PieceSpec::new(1, PieceKind::Target, (2, 3), (0, 1), "t"))
            .with_piece(PieceSpec::new(2, PieceKind::Exit, (2, 1), (2, 0), "e"));
        assert_eq!(layout.validate(), Err(LayoutError::UnreachableExit));
    }
}
