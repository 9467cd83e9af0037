//! Engine Events
//!
//! The typed events that flow between the dispatcher and widgets. Widgets
//! consume input and service events and may answer with any number of
//! outbound events, which the dispatcher queues for the next pass.
//!
//! Events are plain data: they serialize with serde so hosts can log or
//! record a session and replay it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scene::WidgetId;
use crate::tile::Pos;

/// A keyboard key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Enter / Return
    Enter,
    /// Space bar
    Space,
    /// Backspace
    Backspace,
    /// Either shift key, reported on its own
    Shift,
    /// Escape
    Escape,
    /// Home
    Home,
    /// End
    End,
    /// Tab
    Tab,
    /// A printable character other than space
    Char(char),
}

impl Key {
    /// The character this key types, if any
    #[must_use]
    pub const fn printable(&self) -> Option<char> {
        match self {
            Self::Space => Some(' '),
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }
}

/// Non-keyboard input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MiscInput {
    /// Pointer moved to column `x`, row `y` of the screen
    PointerMove {
        /// Column
        x: usize,
        /// Row
        y: usize,
    },
    /// The user asked to close the window
    Close,
}

impl MiscInput {
    /// Pointer position as a `(row, col)` cell, if this is a pointer event
    #[must_use]
    pub const fn pointer_pos(&self) -> Option<Pos> {
        match self {
            Self::PointerMove { x, y } => Some(Pos::new(*y, *x)),
            Self::Close => None,
        }
    }
}

/// Events the dispatcher emits about itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceEvent {
    /// The first tick is about to be delivered
    QueueStarted,
    /// All events of the current tick have been delivered
    TickBoundary,
    /// Shutdown was requested; listeners should wrap up
    ShutdownReady,
    /// The loop should stop now
    Shutdown,
}

/// An event delivered to, or produced by, a widget or listener
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // ============================================
    // Consumed
    // ============================================
    /// Time elapsed since the previous tick
    Tick(Duration),
    /// A key was pressed
    KeyDown(Key),
    /// A key was released
    KeyUp(Key),
    /// Pointer movement or window events
    MiscInput(MiscInput),
    /// Dispatcher lifecycle
    Service(ServiceEvent),

    // ============================================
    // Produced
    // ============================================
    /// A widget changed its visible buffer
    ContentUpdated {
        /// The widget whose tiles changed
        source: WidgetId,
    },
    /// An input field submitted its text
    TextSubmitted {
        /// The input field
        field: WidgetId,
        /// Submitted text
        text: String,
    },
    /// A sound should be played
    PlaySound(String),
    /// Application-defined event, typically returned by menu actions
    Custom {
        /// Event name
        name: String,
        /// Optional payload
        value: Option<String>,
    },
}

impl Event {
    /// Shorthand for a payload-less custom event
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom {
            name: name.into(),
            value: None,
        }
    }

    /// Subscription category of this event
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Tick(_) => EventKind::Tick,
            Self::KeyDown(_) => EventKind::KeyDown,
            Self::KeyUp(_) => EventKind::KeyUp,
            Self::MiscInput(_) => EventKind::MiscInput,
            Self::Service(_) => EventKind::Service,
            Self::ContentUpdated { .. } => EventKind::ContentUpdated,
            Self::TextSubmitted { .. } => EventKind::TextSubmitted,
            Self::PlaySound(_) => EventKind::PlaySound,
            Self::Custom { .. } => EventKind::Custom,
        }
    }
}

/// Event categories used for subscriptions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// [`Event::Tick`]
    Tick,
    /// [`Event::KeyDown`]
    KeyDown,
    /// [`Event::KeyUp`]
    KeyUp,
    /// [`Event::MiscInput`]
    MiscInput,
    /// [`Event::Service`]
    Service,
    /// [`Event::ContentUpdated`]
    ContentUpdated,
    /// [`Event::TextSubmitted`]
    TextSubmitted,
    /// [`Event::PlaySound`]
    PlaySound,
    /// [`Event::Custom`]
    Custom,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [EventKind; 9] = [
        Self::Tick,
        Self::KeyDown,
        Self::KeyUp,
        Self::MiscInput,
        Self::Service,
        Self::ContentUpdated,
        Self::TextSubmitted,
        Self::PlaySound,
        Self::Custom,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::Tick(Duration::from_millis(16)).kind(), EventKind::Tick);
        assert_eq!(Event::KeyDown(Key::Up).kind(), EventKind::KeyDown);
        assert_eq!(
            Event::Service(ServiceEvent::TickBoundary).kind(),
            EventKind::Service
        );
        assert_eq!(Event::custom("quit").kind(), EventKind::Custom);
    }

    #[test]
    fn test_pointer_pos_is_row_col() {
        let input = MiscInput::PointerMove { x: 7, y: 2 };
        assert_eq!(input.pointer_pos(), Some(Pos::new(2, 7)));
        assert_eq!(MiscInput::Close.pointer_pos(), None);
    }

    #[test]
    fn test_events_serialize_for_session_logs() {
        let event = Event::TextSubmitted {
            field: WidgetId::from_raw(4),
            text: "hello".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("TextSubmitted"));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_printable_keys() {
        assert_eq!(Key::Space.printable(), Some(' '));
        assert_eq!(Key::Char('q').printable(), Some('q'));
        assert_eq!(Key::Enter.printable(), None);
    }
}
