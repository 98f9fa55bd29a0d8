//! Viewport regime detection.
//!
//! Widgets never query the terminal themselves. The host tells them the
//! current width (at startup via [`Command::window_size`](crate::Command::window_size),
//! afterwards through resize events) and a [`Breakpoint`] turns that width
//! into a [`ViewportClass`].

/// Which side of the breakpoint the viewport is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    /// Width at or below the breakpoint.
    Mobile,
    /// Width above the breakpoint.
    Desktop,
}

/// Width threshold separating the mobile and desktop regimes.
///
/// A width equal to the threshold counts as mobile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    max_mobile_width: u16,
}

impl Breakpoint {
    /// The classic 768-unit breakpoint.
    pub const WEB: Breakpoint = Breakpoint {
        max_mobile_width: 768,
    };

    /// A breakpoint suited to terminal columns.
    pub const COLUMNS: Breakpoint = Breakpoint {
        max_mobile_width: 100,
    };

    pub fn new(max_mobile_width: u16) -> Self {
        Self { max_mobile_width }
    }

    pub fn max_mobile_width(&self) -> u16 {
        self.max_mobile_width
    }

    pub fn classify(&self, width: u16) -> ViewportClass {
        if width <= self.max_mobile_width {
            ViewportClass::Mobile
        } else {
            ViewportClass::Desktop
        }
    }

    pub fn is_mobile(&self, width: u16) -> bool {
        self.classify(width) == ViewportClass::Mobile
    }

    /// The regime entered when the width changes from `from` to `to`, or
    /// `None` if the change stays on the same side.
    pub fn crossed(&self, from: u16, to: u16) -> Option<ViewportClass> {
        let after = self.classify(to);
        (self.classify(from) != after).then_some(after)
    }
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self::WEB
    }
}
