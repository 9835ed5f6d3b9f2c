//! Terminal helpers shared by the handlers.

pub mod input;
pub mod progress;

pub use input::LinePicker;
pub use progress::CliProgress;
