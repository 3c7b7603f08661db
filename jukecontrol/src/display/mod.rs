//! Two-line display: shared text state, renderer worker and panel access.

pub mod renderer;
pub mod state;
pub mod text;
pub mod wake;

pub use renderer::{
    DisplayPanel, DisplayRenderer, PauseGuard, RendererControl, RendererState, RendererTiming,
    Scroller,
};
pub use state::{DisplaySnapshot, DisplayState};
pub use wake::WakeSignal;
