//! Host events delivered to the application and the outcome of handling them.
//!
//! The browser bridge translates raw DOM events into [`HostEvent`] values and
//! feeds them to [`crate::app::App::dispatch`]. Handlers run to completion one
//! at a time; a [`Outcome::Consumed`] result tells the bridge to prevent the
//! browser's default action for the originating event.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use crate::host::NodeId;

/// A keyboard key, reduced to the ones the components react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Tab,
    Escape,
    Enter,
    Space,
    /// Any other key, as reported by the browser.
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_browser(raw: &str) -> Self {
        match raw {
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Whether this key activates a control (Enter or Space).
    #[must_use]
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

/// Deferred work a component asked the scheduler for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Layout has settled after load; below-the-fold elements may be deferred.
    RevealSettle,
    /// The menu opened a moment ago; focus its first link.
    MenuFocus,
}

/// Everything the application reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Click { target: NodeId },
    KeyDown { key: Key, shift: bool, target: Option<NodeId> },
    Focus { target: NodeId },
    Blur { target: NodeId },
    /// The window scrolled; handled at most once per animation frame.
    Scroll,
    /// An animation frame requested through the scheduler fired.
    Frame,
    Timer(Timer),
    /// The OS colour-scheme preference changed.
    ColorScheme { dark: bool },
    /// Persistent storage changed in another browsing context.
    Storage { key: Option<String>, value: Option<String> },
    /// An observed element started intersecting the viewport.
    Intersect { target: NodeId },
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Ignored,
    /// The event was handled; its browser default action must be prevented.
    Consumed,
}

impl Outcome {
    #[must_use]
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}
