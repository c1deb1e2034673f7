#![forbid(unsafe_code)]

//! Draggable drawers.
//!
//! Pointer events flow through the [`gesture`] tracker into the [`drawer`]
//! state machine, which resolves releases with [`snap`] and commits the
//! result to persistence, focus containment and callbacks.

pub mod drawer;
pub mod gesture;
pub mod snap;
pub mod velocity;

pub use drawer::{
    BASE_DRAWER_Z, CloseReason, ConfigError, Drawer, DrawerConfig, DrawerHost, DrawerId,
    DrawerPhase, DrawerStack, DrawerSurface, DrawerTuning, FocusContainment, PortalContainer,
    SnapPoints, resolve_portal_target,
};
pub use gesture::{GestureOutcome, GestureTracker, OffsetBounds};
pub use snap::{SnapResolver, SnapTarget};
pub use velocity::VelocityTracker;
