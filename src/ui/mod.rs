pub mod app;
pub mod command;
pub mod context;
pub mod grid;

pub use app::App;
pub use context::{Context, GridCursor, Mode, Theme};
pub use grid::{GridView, ScreenGrid};
