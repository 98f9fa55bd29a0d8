//! Page widgets for **vitrine**.
//!
//! The carousel and navbar implement [`vitrine_core::Component`], attach to
//! elements of a shared [`vitrine_core::Page`], and mirror their state back
//! into it as classes and attributes. The fragment loader fills that page
//! from files or HTTP.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`carousel`] | Wrapping card carousel with arrows, dots, swipe gestures, and auto-advance |
//! | [`navbar`] | Dropdown navigation with a mobile regime |
//! | [`fragment`] | Load markup fragments into the page |
//! | [`text`] | Width-aware text helpers |

pub mod carousel;
pub mod error;
pub mod fragment;
pub mod navbar;
pub mod text;

pub use carousel::{Carousel, CarouselOptions};
pub use error::WidgetError;
pub use fragment::{FragmentError, FragmentLoader};
pub use navbar::{Navbar, NavbarOptions};
