#![forbid(unsafe_code)]

//! The document capability a drawer runs against.
//!
//! Drawers never reach for a global document. Everything they need from the
//! host (the focused element, moving focus, pointer capture, a keydown
//! listener, element measurement, the clock) goes through [`Environment`].
//! A browser shim implements it over the DOM; the test harness implements it
//! over an in-memory element tree.
//!
//! # Failure Modes
//!
//! Implementations must not panic on stale ids. Operations on detached or
//! unknown elements are no-ops (`focus` returns `false`, queries return
//! empty/`None`/`0.0`).

use std::cell::RefCell;
use std::rc::Rc;

use web_time::Instant;

use crate::direction::Axis;
use crate::event::PointerId;

/// Opaque handle to an element in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Identifies a document-level keydown listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Host document capability.
pub trait Environment {
    /// Current time, used to drive settle animations.
    fn now(&self) -> Instant;

    /// The element that currently has keyboard focus.
    fn active_element(&self) -> Option<ElementId>;

    /// Move keyboard focus. Returns `false` if the element cannot take focus.
    fn focus(&mut self, element: ElementId) -> bool;

    /// Whether the element is still attached to the document.
    fn is_attached(&self, element: ElementId) -> bool;

    /// Whether `element` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool;

    /// Focusable descendants of `root`, in tab order. `root` itself is not
    /// included.
    fn focusable_descendants(&self, root: ElementId) -> Vec<ElementId>;

    /// Make an element programmatically focusable (`tabindex=-1`).
    fn make_focusable(&mut self, element: ElementId);

    /// Size of an element along an axis, in pixels.
    fn extent(&self, element: ElementId, axis: Axis) -> f32;

    /// Route all further events of `pointer` to `element`.
    fn set_pointer_capture(&mut self, element: ElementId, pointer: PointerId);

    /// Undo [`set_pointer_capture`](Self::set_pointer_capture).
    fn release_pointer_capture(&mut self, element: ElementId, pointer: PointerId);

    /// Register a document-level keydown listener.
    fn add_keydown_listener(&mut self, listener: ListenerId);

    /// Remove a listener registered with
    /// [`add_keydown_listener`](Self::add_keydown_listener).
    fn remove_keydown_listener(&mut self, listener: ListenerId);

    /// The document body, the default portal container.
    fn body(&self) -> ElementId;

    /// Resolve a CSS-style selector to the first matching element.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;
}

/// Environment shared between every drawer of one document.
pub type SharedEnvironment = Rc<RefCell<dyn Environment>>;
