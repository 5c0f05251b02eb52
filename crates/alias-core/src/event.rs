use serde::{Deserialize, Serialize};

use crate::ops::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Escape,
    Tab,
    Space,
    Backspace,
    Delete,
    Character(char),
}

impl Key {
    pub fn from_char(ch: char) -> Self {
        match ch {
            ' ' => Key::Space,
            '\t' => Key::Tab,
            '\n' | '\r' => Key::Enter,
            ch => Key::Character(ch),
        }
    }

    /// Word-boundary keys that end the mention cooldown.
    pub fn is_break(&self) -> bool {
        matches!(self, Key::Space | Key::Enter | Key::Tab)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    /// A node inside the editable region.
    Region(Path),
    /// Anywhere else in the window.
    Outside,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    Input,
    KeyDown(Key),
    KeyUp(Key),
    Pointer(PointerTarget),
    DragOver { x: f32, y: f32 },
    Drop { target: Option<Path> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Input,
    KeyDown,
    KeyUp,
    Pointer,
    DragOver,
    Drop,
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::Input => EventKind::Input,
            EditorEvent::KeyDown(_) => EventKind::KeyDown,
            EditorEvent::KeyUp(_) => EventKind::KeyUp,
            EditorEvent::Pointer(_) => EventKind::Pointer,
            EditorEvent::DragOver { .. } => EventKind::DragOver,
            EditorEvent::Drop { .. } => EventKind::Drop,
        }
    }
}

/// What the handlers did with an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub content_changed: bool,
}

impl EventOutcome {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn prevent_default(mut self) -> Self {
        self.default_prevented = true;
        self
    }

    pub fn stop_propagation(mut self) -> Self {
        self.propagation_stopped = true;
        self
    }

    pub fn changed(mut self, changed: bool) -> Self {
        self.content_changed |= changed;
        self
    }

    pub fn merge(&mut self, other: EventOutcome) {
        self.default_prevented |= other.default_prevented;
        self.propagation_stopped |= other.propagation_stopped;
        self.content_changed |= other.content_changed;
    }
}
