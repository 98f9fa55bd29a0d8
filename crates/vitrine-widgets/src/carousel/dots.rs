//! Dot row showing which slide is active.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Style configuration for the dot row.
#[derive(Debug, Clone)]
pub struct DotsStyle {
    /// Style for the active slide's dot.
    pub active: Style,
    /// Style for every other dot.
    pub inactive: Style,
}

impl Default for DotsStyle {
    fn default() -> Self {
        Self {
            active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            inactive: Style::default().fg(Color::DarkGray),
        }
    }
}

/// A centered row of `●`/`○` dots, one per slide, separated by spaces.
#[derive(Debug, Clone, Copy)]
pub struct Dots {
    pub total: usize,
    pub active: usize,
}

impl Dots {
    /// Columns the row occupies: one per dot plus one gap between each.
    pub fn width(&self) -> u16 {
        (self.total * 2).saturating_sub(1).min(u16::MAX as usize) as u16
    }

    /// The centered rectangle the dots occupy inside `area`.
    pub fn placement(&self, area: Rect) -> Rect {
        let width = self.width().min(area.width);
        let x = area.x + (area.width - width) / 2;
        Rect::new(x, area.y, width, area.height.min(1))
    }

    /// Which dot sits at column `x`, if any. Gaps between dots hit nothing.
    pub fn hit(&self, area: Rect, x: u16) -> Option<usize> {
        let placed = self.placement(area);
        if x < placed.x || x >= placed.right() {
            return None;
        }
        let offset = (x - placed.x) as usize;
        (offset % 2 == 0).then_some(offset / 2)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, style: &DotsStyle) {
        if area.width == 0 || area.height == 0 || self.total == 0 {
            return;
        }
        let mut spans = Vec::with_capacity(self.total * 2);
        for i in 0..self.total {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            if i == self.active {
                spans.push(Span::styled("●", style.active));
            } else {
                spans.push(Span::styled("○", style.inactive));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), self.placement(area));
    }
}
