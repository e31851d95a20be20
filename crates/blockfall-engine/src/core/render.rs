use serde::Serialize;

use super::cell::{Cell, CellColor, CellPosition};

/// Number of pixels covered by one grid unit on the rendering side.
pub const CELL_PIXEL_SIZE: i32 = 30;

/// Pixel offset passed to [`Renderer::reposition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelDelta {
    pub dx: i32,
    pub dy: i32,
}

impl PixelDelta {
    /// Converts a grid delta into pixels.
    #[must_use]
    pub const fn from_grid(dx: i32, dy: i32) -> Self {
        Self {
            dx: dx * CELL_PIXEL_SIZE,
            dy: dy * CELL_PIXEL_SIZE,
        }
    }
}

/// Drawing interface the engine calls into.
///
/// Every primitive is keyed by the grid position carried by the [`Cell`]
/// argument. [`Renderer::reposition`] receives the cell as it was *before*
/// the move, so an implementation can look up the visual it created in
/// [`Renderer::render`].
pub trait Renderer {
    fn render(&mut self, cell: &Cell);
    fn reposition(&mut self, cell: &Cell, delta: PixelDelta);
    fn erase(&mut self, cell: &Cell);
    fn display_score(&mut self, score: u32);
    fn display_level(&mut self, level: u32);
    fn display_game_over(&mut self);
}

impl<R> Renderer for &mut R
where
    R: Renderer + ?Sized,
{
    fn render(&mut self, cell: &Cell) {
        (**self).render(cell);
    }

    fn reposition(&mut self, cell: &Cell, delta: PixelDelta) {
        (**self).reposition(cell, delta);
    }

    fn erase(&mut self, cell: &Cell) {
        (**self).erase(cell);
    }

    fn display_score(&mut self, score: u32) {
        (**self).display_score(score);
    }

    fn display_level(&mut self, level: u32) {
        (**self).display_level(level);
    }

    fn display_game_over(&mut self) {
        (**self).display_game_over();
    }
}

/// Renderer that discards every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _cell: &Cell) {}
    fn reposition(&mut self, _cell: &Cell, _delta: PixelDelta) {}
    fn erase(&mut self, _cell: &Cell) {}
    fn display_score(&mut self, _score: u32) {}
    fn display_level(&mut self, _level: u32) {}
    fn display_game_over(&mut self) {}
}

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RenderEvent {
    Render {
        position: CellPosition,
        color: CellColor,
    },
    Reposition {
        position: CellPosition,
        delta: PixelDelta,
    },
    Erase {
        position: CellPosition,
    },
    Score {
        value: u32,
    },
    Level {
        value: u32,
    },
    GameOver,
}

/// Renderer that keeps every call in order.
///
/// Used by tests and by the CLI trace output.
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameSession, PieceSeed, RecordingRenderer, RenderEvent};
///
/// let session = GameSession::with_seed(PieceSeed::from_u128(7), RecordingRenderer::new());
/// let events = session.renderer().events();
///
/// assert_eq!(events[0], RenderEvent::Score { value: 0 });
/// assert_eq!(events[1], RenderEvent::Level { value: 1 });
/// assert_eq!(events.iter().filter(|e| e.is_render()).count(), 4);
/// ```
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<RenderEvent> {
        self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, cell: &Cell) {
        self.events.push(RenderEvent::Render {
            position: cell.position(),
            color: cell.color(),
        });
    }

    fn reposition(&mut self, cell: &Cell, delta: PixelDelta) {
        self.events.push(RenderEvent::Reposition {
            position: cell.position(),
            delta,
        });
    }

    fn erase(&mut self, cell: &Cell) {
        self.events.push(RenderEvent::Erase {
            position: cell.position(),
        });
    }

    fn display_score(&mut self, score: u32) {
        self.events.push(RenderEvent::Score { value: score });
    }

    fn display_level(&mut self, level: u32) {
        self.events.push(RenderEvent::Level { value: level });
    }

    fn display_game_over(&mut self) {
        self.events.push(RenderEvent::GameOver);
    }
}
