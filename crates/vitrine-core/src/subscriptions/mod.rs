//! Built-in subscription sources.
//!
//! - **Terminal events** ([`terminal_events`]) -- keyboard, mouse, resize, and
//!   focus events from the terminal.
//! - **Repeating timer** ([`Every`]) -- fixed-interval ticks, restartable by
//!   generation.

mod terminal;
mod timer;

pub use terminal::*;
pub use timer::*;
