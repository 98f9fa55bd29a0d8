use super::dots::DotsStyle;
use super::gesture::GestureConfig;
use ratatui::style::{Color, Modifier, Style};
use std::time::Duration;
use vitrine_core::Breakpoint;

/// Construction options for a [`Carousel`](super::Carousel).
///
/// ```rust,ignore
/// let options = CarouselOptions::default()
///     .with_cards_per_view(2)
///     .with_auto_slide(Duration::from_secs(4))
///     .with_gesture(GestureConfig::cells());
/// ```
#[derive(Debug, Clone)]
pub struct CarouselOptions {
    /// Cards visible at once (default 3, at least 1).
    pub cards_per_view: usize,
    /// Advance automatically (default false).
    pub auto_slide: bool,
    /// Delay between automatic advances (default 5s, at least 1ms).
    pub auto_slide_interval: Duration,
    /// Recognize press-drag-release gestures on the cards (default true).
    pub enable_touch: bool,
    /// Show one dot per card (default true).
    pub enable_dots: bool,
    /// Show previous/next arrows (default true).
    pub enable_arrows: bool,
    /// Gesture thresholds.
    pub gesture: GestureConfig,
    /// Width threshold for resize handling.
    pub breakpoint: Breakpoint,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            cards_per_view: 3,
            auto_slide: false,
            auto_slide_interval: Duration::from_millis(5000),
            enable_touch: true,
            enable_dots: true,
            enable_arrows: true,
            gesture: GestureConfig::default(),
            breakpoint: Breakpoint::default(),
        }
    }
}

impl CarouselOptions {
    pub fn with_cards_per_view(mut self, n: usize) -> Self {
        self.cards_per_view = n;
        self
    }

    /// Turn on auto-advance with the given interval.
    pub fn with_auto_slide(mut self, interval: Duration) -> Self {
        self.auto_slide = true;
        self.auto_slide_interval = interval;
        self
    }

    pub fn with_touch(mut self, enabled: bool) -> Self {
        self.enable_touch = enabled;
        self
    }

    pub fn with_dots(mut self, enabled: bool) -> Self {
        self.enable_dots = enabled;
        self
    }

    pub fn with_arrows(mut self, enabled: bool) -> Self {
        self.enable_arrows = enabled;
        self
    }

    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    pub fn with_breakpoint(mut self, breakpoint: Breakpoint) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    /// Clamp values that must be positive.
    pub(crate) fn normalized(mut self) -> Self {
        if self.cards_per_view == 0 {
            tracing::warn!("cards_per_view must be positive; using 1");
            self.cards_per_view = 1;
        }
        if self.auto_slide_interval.is_zero() {
            tracing::warn!("auto_slide_interval must be positive; using 1ms");
            self.auto_slide_interval = Duration::from_millis(1);
        }
        self
    }
}

/// Visual style for the carousel.
#[derive(Debug, Clone)]
pub struct CarouselStyle {
    pub card_border: Style,
    pub card_title: Style,
    pub card_text: Style,
    /// Links and buttons inside cards.
    pub action: Style,
    pub arrow: Style,
    pub dots: DotsStyle,
}

impl Default for CarouselStyle {
    fn default() -> Self {
        Self {
            card_border: Style::default().fg(Color::DarkGray),
            card_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            card_text: Style::default(),
            action: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            arrow: Style::default().fg(Color::Cyan),
            dots: DotsStyle::default(),
        }
    }
}
