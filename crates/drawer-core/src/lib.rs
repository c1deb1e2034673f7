#![forbid(unsafe_code)]

//! Core types for draggable drawers.
//!
//! This crate has no knowledge of drawer state. It defines the vocabulary the
//! rest of the workspace speaks:
//!
//! - [`direction`]: which viewport edge a drawer is attached to, and how a
//!   pointer delta projects onto its drag axis.
//! - [`geometry`]: points in viewport pixels.
//! - [`event`]: pointer, keyboard, and focus-loss input.
//! - [`environment`]: the injected document capability (focus, listeners,
//!   pointer capture, measurement, clock).

pub mod direction;
pub mod environment;
pub mod event;
pub mod geometry;

pub use direction::{Axis, Direction, ParseDirectionError};
pub use environment::{ElementId, Environment, ListenerId, SharedEnvironment};
pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEvent, PointerEventKind, PointerId,
};
pub use geometry::Point;
