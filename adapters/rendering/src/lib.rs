#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Hakoiri adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use hakoiri_core::{
    CellCoord, CellRect, Direction, PieceId, PieceKind, PieceSnapshot, PuzzleSnapshot,
};
use std::{error::Error, fmt};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fill colors assigned to each piece kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill used for ordinary sliding pieces.
    pub movable: Color,
    /// Fill used for the target piece.
    pub target: Color,
    /// Fill used for fixed walls.
    pub wall: Color,
    /// Fill used for the exit slot.
    pub exit: Color,
    /// Amount the selected piece is lightened by.
    pub selection_lighten: f32,
}

impl Palette {
    /// Returns the fill for a piece of the provided kind.
    #[must_use]
    pub const fn fill(&self, kind: PieceKind) -> Color {
        match kind {
            PieceKind::Movable => self.movable,
            PieceKind::Target => self.target,
            PieceKind::Wall => self.wall,
            PieceKind::Exit => self.exit,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            movable: Color::from_rgb_u8(196, 154, 108),
            target: Color::from_rgb_u8(214, 69, 80),
            wall: Color::from_rgb_u8(72, 62, 56),
            exit: Color::from_rgb_u8(120, 180, 110),
            selection_lighten: 0.35,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Key pressed on this frame, if any.
    pub key: Option<KeyPress>,
    /// Board-relative pixel position where the pointer went down.
    pub pointer_pressed: Option<Vec2>,
    /// Board-relative pixel position where the pointer was released.
    pub pointer_released: Option<Vec2>,
    /// Whether the player asked to restart the puzzle.
    pub reset: bool,
}

/// Keys forwarded from adapters to the input system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPress {
    /// Arrow key pointing in the provided direction.
    Arrow(Direction),
    /// Escape key.
    Escape,
}

/// Describes the board grid and its pixel geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell in pixels.
    pub cell_size: f32,
}

impl BoardPresentation {
    /// Creates a new board descriptor.
    ///
    /// Returns an error when the grid has no area or the cell size is not a
    /// positive finite number.
    pub fn new(columns: u32, rows: u32, cell_size: f32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            columns,
            rows,
            cell_size,
        })
    }

    /// Calculates the total width of the board in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Calculates the total height of the board in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Pixel position of the top-left corner of `cell`.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_size
    }

    /// Pixel position of the centre of `region`.
    #[must_use]
    pub fn region_center(&self, region: CellRect) -> Vec2 {
        let size = region.size();
        let extent = Vec2::new(size.width() as f32, size.height() as f32) * self.cell_size;
        self.cell_origin(region.origin()) + extent * 0.5
    }

    /// Maps a pixel position to the cell beneath it.
    ///
    /// Returns `None` for positions outside the board.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> Option<CellCoord> {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let scaled = (position / self.cell_size).floor();
        if scaled.x >= self.columns as f32 || scaled.y >= self.rows as f32 {
            return None;
        }
        Some(CellCoord::new(scaled.x as u32, scaled.y as u32))
    }
}

/// Piece prepared for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecePresentation {
    /// Identifier of the piece.
    pub id: PieceId,
    /// Kind of the piece.
    pub kind: PieceKind,
    /// Cells covered by the piece.
    pub region: CellRect,
    /// Caption drawn on the piece.
    pub label: String,
    /// Fill color, already lightened when the piece is selected.
    pub color: Color,
    /// Whether the piece is the current selection.
    pub selected: bool,
}

impl PiecePresentation {
    /// Creates a presentation for a snapshotted piece.
    #[must_use]
    pub fn from_snapshot(piece: &PieceSnapshot, palette: &Palette, selected: bool) -> Self {
        let base = palette.fill(piece.kind);
        let color = if selected {
            base.lighten(palette.selection_lighten)
        } else {
            base
        };
        Self {
            id: piece.id,
            kind: piece.kind,
            region: piece.region,
            label: piece.label.clone(),
            color,
            selected,
        }
    }
}

/// Scene description combining the board, its pieces and the session status.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board geometry.
    pub board: BoardPresentation,
    /// Pieces in drawing order. Exits come first so pieces passing through
    /// them are drawn on top.
    pub pieces: Vec<PiecePresentation>,
    /// Moves applied since the last reset.
    pub move_count: u32,
    /// Fewest moves ever needed to solve the puzzle.
    pub best_score: Option<u32>,
    /// Whether the puzzle is solved.
    pub won: bool,
    /// Currently selected piece.
    pub selected: Option<PieceId>,
    /// Directions the selected piece can move in.
    pub selected_moves: Vec<Direction>,
    /// Whether piece captions should be drawn.
    pub show_labels: bool,
}

impl Scene {
    /// Builds a scene from a puzzle snapshot.
    #[must_use]
    pub fn from_snapshot(
        board: BoardPresentation,
        snapshot: &PuzzleSnapshot,
        palette: &Palette,
        best_score: Option<u32>,
        selected_moves: Vec<Direction>,
    ) -> Self {
        let exits = snapshot
            .pieces
            .iter()
            .filter(|piece| piece.kind == PieceKind::Exit);
        let others = snapshot
            .pieces
            .iter()
            .filter(|piece| piece.kind != PieceKind::Exit);
        let pieces = exits
            .chain(others)
            .map(|piece| {
                let selected = snapshot.selected == Some(piece.id);
                PiecePresentation::from_snapshot(piece, palette, selected)
            })
            .collect();

        Self {
            board,
            pieces,
            move_count: snapshot.move_count,
            best_score,
            won: snapshot.won,
            selected: snapshot.selected,
            selected_moves,
            show_labels: true,
        }
    }

    /// Finds the presentation of a piece by identifier.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&PiecePresentation> {
        self.pieces.iter().find(|piece| piece.id == id)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Hakoiri scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives per-frame input captured
    /// by the adapter and may mutate the scene before it is presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene);
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Grid must have at least one column and one row.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cell size must be a positive finite number of pixels.
    InvalidCellSize {
        /// Provided cell size that failed validation.
        cell_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "board must not be empty (received {columns}x{rows})")
            }
            Self::InvalidCellSize { cell_size } => {
                write!(
                    f,
                    "cell_size must be positive and finite (received {cell_size})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use hakoiri_core::CellRectSize;

    fn board() -> BoardPresentation {
        BoardPresentation::new(6, 6, 80.0).expect("valid board")
    }

    fn snapshot_piece(id: u32, kind: PieceKind, origin: (u32, u32)) -> PieceSnapshot {
        PieceSnapshot {
            id: PieceId::new(id),
            kind,
            region: CellRect::from_origin_and_size(
                CellCoord::new(origin.0, origin.1),
                CellRectSize::new(2, 1),
            ),
            label: format!("piece {id}"),
        }
    }

    #[test]
    fn board_rejects_invalid_cell_sizes_without_panicking() {
        for cell_size in [0.0, -4.0, f32::NAN, f32::INFINITY] {
            let error = BoardPresentation::new(6, 6, cell_size)
                .expect_err("invalid cell size must be rejected");
            assert!(matches!(error, RenderingError::InvalidCellSize { .. }));
        }
        assert_eq!(
            BoardPresentation::new(0, 6, 80.0),
            Err(RenderingError::EmptyGrid {
                columns: 0,
                rows: 6
            })
        );
    }

    #[test]
    fn board_dimensions_scale_with_cell_size() {
        let board = board();
        assert_eq!(board.width(), 480.0);
        assert_eq!(board.height(), 480.0);
        assert_eq!(board.cell_origin(CellCoord::new(2, 3)), Vec2::new(160.0, 240.0));
    }

    #[test]
    fn world_to_cell_uses_floor_division() {
        let board = board();
        assert_eq!(
            board.world_to_cell(Vec2::new(160.0, 0.0)),
            Some(CellCoord::new(2, 0))
        );
        assert_eq!(
            board.world_to_cell(Vec2::new(159.99, 79.99)),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(board.world_to_cell(Vec2::new(480.0, 10.0)), None);
        assert_eq!(board.world_to_cell(Vec2::new(-0.1, 10.0)), None);
        assert_eq!(board.world_to_cell(Vec2::new(f32::NAN, 10.0)), None);
    }

    #[test]
    fn region_center_lies_inside_region() {
        let board = board();
        let region = CellRect::from_origin_and_size(CellCoord::new(3, 0), CellRectSize::new(2, 2));
        let center = board.region_center(region);
        assert_eq!(center, Vec2::new(320.0, 80.0));
        assert_eq!(board.world_to_cell(center), Some(CellCoord::new(4, 1)));
    }

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert_eq!(color, Color::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(Color::from_rgb_u8(0, 0, 0).lighten(4.0), Color::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn scene_draws_exits_first_and_highlights_selection() {
        let snapshot = PuzzleSnapshot {
            pieces: vec![
                snapshot_piece(1, PieceKind::Target, (2, 3)),
                snapshot_piece(2, PieceKind::Movable, (0, 0)),
                snapshot_piece(17, PieceKind::Exit, (2, 5)),
            ],
            columns: 6,
            rows: 6,
            cells: vec![None; 36],
            move_count: 7,
            won: false,
            selected: Some(PieceId::new(2)),
        };
        let palette = Palette::default();

        let scene = Scene::from_snapshot(
            board(),
            &snapshot,
            &palette,
            Some(81),
            vec![Direction::Right],
        );

        let order: Vec<u32> = scene.pieces.iter().map(|piece| piece.id.get()).collect();
        assert_eq!(order, vec![17, 1, 2]);
        let selected = scene.piece(PieceId::new(2)).expect("selected piece");
        assert!(selected.selected);
        assert_eq!(
            selected.color,
            palette.movable.lighten(palette.selection_lighten)
        );
        let target = scene.piece(PieceId::new(1)).expect("target piece");
        assert_eq!(target.color, palette.target);
        assert_eq!(scene.move_count, 7);
        assert_eq!(scene.best_score, Some(81));
        assert_eq!(scene.selected_moves, vec![Direction::Right]);
    }
}
