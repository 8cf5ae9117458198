use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Input events delivered by the host's gesture dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Scroll wheel or trackpad; positive `delta` zooms in
    Scroll { delta: f64, position: Point },
    /// Drag in progress, incremental since the previous drag event
    Drag { delta: Point },
    /// End of drag operation
    DragEnd,
    /// Keyboard input
    KeyPress { key: KeyCode },
    /// Canvas resize
    Resize { size: Point },
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Plus,
    Minus,
    Home,
    Other(u32),
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn from_changed(changed: bool) -> Self {
        if changed {
            Self::Handled
        } else {
            Self::NotHandled
        }
    }

    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }
}
