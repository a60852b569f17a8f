#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system translating keyboard and pointer activity into puzzle commands.

use glam::{IVec2, Vec2};
use hakoiri_core::{CellCoord, Command, Direction, Event, PieceId, PieceSnapshot};

/// Pointer travel, in pixels, below which a press and release count as a tap.
pub const TAP_THRESHOLD: f32 = 10.0;

/// Keys the puzzle reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow key pointing in the provided direction.
    Arrow(Direction),
    /// Escape key.
    Escape,
}

/// Input snapshot distilled from adapter-provided frame data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputFrame {
    /// Key pressed during this frame, if any.
    pub key: Option<Key>,
    /// Board-relative pixel position where the pointer went down this frame.
    pub pointer_pressed: Option<Vec2>,
    /// Board-relative pixel position where the pointer was released this frame.
    pub pointer_released: Option<Vec2>,
    /// Side length of a rendered cell in pixels.
    pub cell_size: f32,
}

impl InputFrame {
    /// Creates an empty frame for the provided cell size.
    #[must_use]
    pub const fn new(cell_size: f32) -> Self {
        Self {
            key: None,
            pointer_pressed: None,
            pointer_released: None,
            cell_size,
        }
    }
}

/// Multi-cell relocation requested by a finished drag gesture.
///
/// The engine only moves one cell at a time, so adapters resolve the request
/// with [`drag_piece`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragRequest {
    /// Piece being dragged.
    pub piece: PieceId,
    /// Origin of the piece when the drag began.
    pub from: CellCoord,
    /// Origin cell under the dropped piece. May lie outside the grid.
    pub to: IVec2,
}

#[derive(Clone, Copy, Debug)]
struct ActiveDrag {
    piece: PieceId,
    from: CellCoord,
    start: Vec2,
    offset: Vec2,
}

/// Input system that tracks selection and drag state across frames.
#[derive(Debug, Default)]
pub struct Input {
    won: bool,
    selected: Option<PieceId>,
    drag: Option<ActiveDrag>,
}

impl Input {
    /// Creates a new input system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            won: false,
            selected: None,
            drag: None,
        }
    }

    /// Piece the system believes is selected, as last reported by the world.
    #[must_use]
    pub const fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    /// Reports whether a drag gesture is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Consumes world events and frame input, emitting commands.
    ///
    /// The `piece_at` closure should mirror the world's `query::piece_at`
    /// helper for the frame's cell size. A completed drag is returned rather
    /// than emitted since it expands into several single-cell moves.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        frame: InputFrame,
        mut piece_at: F,
        out: &mut Vec<Command>,
    ) -> Option<DragRequest>
    where
        F: FnMut(Vec2) -> Option<PieceSnapshot>,
    {
        for event in events {
            match event {
                Event::PuzzleSolved { .. } => {
                    self.won = true;
                    self.drag = None;
                }
                Event::PuzzleReset => {
                    self.won = false;
                    self.selected = None;
                    self.drag = None;
                }
                Event::SelectionChanged { piece } => self.selected = *piece,
                _ => {}
            }
        }

        if self.won {
            return None;
        }

        if let (Some(key), Some(piece)) = (frame.key, self.selected) {
            match key {
                Key::Arrow(direction) => out.push(Command::MovePiece { piece, direction }),
                Key::Escape => out.push(Command::ClearSelection),
            }
        }

        if let Some(position) = frame.pointer_pressed {
            self.press(position, frame.cell_size, &mut piece_at, out);
        }

        frame
            .pointer_released
            .and_then(|position| self.release(position, frame.cell_size))
    }

    fn press<F>(&mut self, position: Vec2, cell_size: f32, piece_at: &mut F, out: &mut Vec<Command>)
    where
        F: FnMut(Vec2) -> Option<PieceSnapshot>,
    {
        let Some(piece) = piece_at(position) else {
            return;
        };
        if !piece.kind.is_movable() {
            return;
        }

        let from = piece.region.origin();
        let origin_pixels = Vec2::new(from.column() as f32, from.row() as f32) * cell_size;
        out.push(Command::SelectPiece { piece: piece.id });
        self.drag = Some(ActiveDrag {
            piece: piece.id,
            from,
            start: position,
            offset: position - origin_pixels,
        });
    }

    fn release(&mut self, position: Vec2, cell_size: f32) -> Option<DragRequest> {
        let drag = self.drag.take()?;
        if position.distance(drag.start) < TAP_THRESHOLD {
            return None;
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return None;
        }

        let dropped = ((position - drag.offset) / cell_size).round();
        Some(DragRequest {
            piece: drag.piece,
            from: drag.from,
            to: dropped.as_ivec2(),
        })
    }
}

/// Walks a piece from `from` toward `to` one cell at a time.
///
/// The horizontal axis is resolved first, then the vertical one. Each axis
/// stops at its first failed step. Returns the number of successful steps.
pub fn drag_piece<F>(from: CellCoord, to: IVec2, mut step: F) -> u32
where
    F: FnMut(Direction) -> bool,
{
    let column_delta = i64::from(to.x) - i64::from(from.column());
    let row_delta = i64::from(to.y) - i64::from(from.row());

    let horizontal = walk_axis(column_delta, Direction::Right, Direction::Left, &mut step);
    let vertical = walk_axis(row_delta, Direction::Down, Direction::Up, &mut step);
    horizontal + vertical
}

fn walk_axis<F>(delta: i64, positive: Direction, negative: Direction, step: &mut F) -> u32
where
    F: FnMut(Direction) -> bool,
{
    let direction = if delta > 0 { positive } else { negative };
    let mut moved = 0;
    for _ in 0..delta.unsigned_abs() {
        if !step(direction) {
            break;
        }
        moved += 1;
    }
    moved
}
