use crossterm::event::{KeyEvent, MouseEvent};

/// Terminal events delivered through
/// [`terminal_events`](crate::subscriptions::terminal_events).
///
/// Each variant wraps the crossterm payload so widgets can match on key codes,
/// mouse buttons, and positions directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse press, drag, release, motion, or wheel event.
    Mouse(MouseEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Terminal window gained focus.
    FocusGained,
    /// Terminal window lost focus.
    FocusLost,
}

impl TerminalEvent {
    /// Convert a crossterm event. Bracketed paste has no meaning for the
    /// widgets here and is dropped.
    pub fn from_crossterm(event: crossterm::event::Event) -> Option<Self> {
        use crossterm::event::Event;
        match event {
            Event::Key(k) => Some(TerminalEvent::Key(k)),
            Event::Mouse(m) => Some(TerminalEvent::Mouse(m)),
            Event::Resize(w, h) => Some(TerminalEvent::Resize(w, h)),
            Event::FocusGained => Some(TerminalEvent::FocusGained),
            Event::FocusLost => Some(TerminalEvent::FocusLost),
            Event::Paste(_) => None,
        }
    }
}
