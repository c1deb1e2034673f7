#![forbid(unsafe_code)]

//! Input events consumed by drawers.
//!
//! Events are produced by the host (a browser shim, a windowing backend, or a
//! test harness) and handed to a drawer one at a time, on the thread that owns
//! it. Pointer events carry their own timestamp so gesture velocity does not
//! depend on when the event is processed.

use bitflags::bitflags;
use web_time::Instant;

use crate::environment::ElementId;
use crate::geometry::Point;

/// Identifier of a pointer (mouse, pen, or a single touch contact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

/// Pointer event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// The platform took the pointer away (capture lost, touch cancelled).
    Cancel,
}

/// A pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerEventKind,
    pub position: Point,
    pub timestamp: Instant,
    /// Innermost element under the pointer, if the host hit-tested one.
    pub target: Option<ElementId>,
}

impl PointerEvent {
    /// Create a pointer event without a hit-test target.
    pub fn new(id: PointerId, kind: PointerEventKind, position: Point, timestamp: Instant) -> Self {
        Self {
            id,
            kind,
            position,
            timestamp,
            target: None,
        }
    }

    /// Attach the element under the pointer.
    #[must_use]
    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Keys the drawer reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Tab,
    /// Shift+Tab as reported by terminals and some platforms.
    BackTab,
    Enter,
    Char(char),
    Other,
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Key event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn press(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Set modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this is a press (or auto-repeat) of Escape.
    pub fn is_escape(&self) -> bool {
        self.code == KeyCode::Escape && self.kind != KeyEventKind::Release
    }

    /// Focus traversal requested by this event: `Some(true)` for backwards
    /// (Shift+Tab), `Some(false)` for forwards, `None` if not a Tab press.
    pub fn tab_direction(&self) -> Option<bool> {
        if self.kind == KeyEventKind::Release {
            return None;
        }
        match self.code {
            KeyCode::Tab => Some(self.modifiers.contains(Modifiers::SHIFT)),
            KeyCode::BackTab => Some(true),
            _ => None,
        }
    }
}

/// Input delivered to a drawer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Pointer(PointerEvent),
    Key(KeyEvent),
    /// The window lost focus. Active gestures are cancelled.
    Blur,
}
