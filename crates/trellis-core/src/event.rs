use crossterm::event::{Event, KeyEvent, KeyEventKind};

/// Terminal input delivered to [`Model::event`](crate::Model::event).
///
/// Only the events the widgets react to are surfaced; mouse and focus
/// reports are discarded by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A key press.
    Key(KeyEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Bracketed paste content.
    Paste(String),
}

impl TerminalEvent {
    /// Convert a crossterm event, dropping key releases and repeats.
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(k) if k.kind == KeyEventKind::Press => Some(TerminalEvent::Key(k)),
            Event::Resize(w, h) => Some(TerminalEvent::Resize(w, h)),
            Event::Paste(s) => Some(TerminalEvent::Paste(s)),
            _ => None,
        }
    }
}
