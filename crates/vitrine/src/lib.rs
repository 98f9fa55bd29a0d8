//! **vitrine**: carousel and dropdown navbar widgets for terminal pages,
//! built on an Elm-style runtime for [`ratatui`].
//!
//! This umbrella crate re-exports everything from a single dependency:
//!
//! * all public items of [`vitrine_core`] at the crate root ([`Model`],
//!   [`Component`], [`Command`], [`Subscription`], [`Page`], [`Program`],
//!   [`run`], [`run_with`], ...);
//! * the [`widgets`] module with [`vitrine_widgets`] (carousel, navbar,
//!   fragment loader);
//! * [`ratatui`], [`crossterm`], and [`tokio`], so applications need no
//!   direct dependency on them.
//!
//! # Quick start
//!
//! ```ignore
//! use vitrine::widgets::carousel::{self, Carousel, CarouselOptions};
//! use vitrine::{Command, Component, Element, Model, Page};
//!
//! let page = Page::new();
//! let track = page.append(page.body(), Element::new("div").with_id("plans"))?;
//! for name in ["Basic", "Pro", "Team", "Enterprise"] {
//!     page.append(track, Element::new("div").with_text(name))?;
//! }
//! let plans = Carousel::create(&page, "plans", CarouselOptions::default())?;
//! ```
//!
//! See `demos/pricing.rs` and `demos/navbar.rs` for complete programs.

pub use vitrine_core::*;
pub mod widgets {
    pub use vitrine_widgets::*;
}

pub use crossterm;
pub use ratatui;
pub use tokio;
