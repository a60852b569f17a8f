//! Dense occupancy index derived from the piece list.

use hakoiri_core::{BoardView, CellCoord, PieceId, PieceKind};

use crate::{layout::grid_cells, Piece};

/// Maps every cell to the piece covering it.
///
/// The board is never the source of truth for positions; it is rebuilt from
/// the piece list after each mutation so collision checks cost
/// O(footprint) rather than O(piece count).
#[derive(Clone, Debug)]
pub(crate) struct Board {
    columns: u32,
    rows: u32,
    cells: Vec<Option<PieceId>>,
}

impl Board {
    /// Allocates an empty grid.
    ///
    /// Grids larger than the layout limit collapse to zero columns and rows,
    /// so the recorded dimensions always match the allocation.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        match grid_cells(columns, rows) {
            Some(capacity) => Self {
                columns,
                rows,
                cells: vec![None; capacity],
            },
            None => Self {
                columns: 0,
                rows: 0,
                cells: Vec::new(),
            },
        }
    }

    /// Clears the grid and writes every footprint.
    ///
    /// Exit markers go first so a target sitting in the exit slot owns the
    /// shared cells.
    pub(crate) fn rebuild(&mut self, pieces: &[Piece]) {
        self.cells.fill(None);
        let exits = pieces.iter().filter(|piece| piece.kind == PieceKind::Exit);
        let others = pieces.iter().filter(|piece| piece.kind != PieceKind::Exit);
        for piece in exits.chain(others) {
            for cell in piece.region.cells() {
                if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
                    *slot = Some(piece.id);
                }
            }
        }
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<PieceId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.cells, self.columns, self.rows)
    }

    pub(crate) fn cells(&self) -> &[Option<PieceId>] {
        &self.cells
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
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
