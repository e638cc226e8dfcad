//! Console front-end
//!
//! Renders the current view on stdout and reads player commands from stdin.

mod cards;
mod input;
mod screen;

pub use input::ConsoleInput;
pub use screen::Screen;
