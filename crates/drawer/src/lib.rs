#![forbid(unsafe_code)]

//! Draggable drawer (bottom sheet) primitive.
//!
//! A drawer slides in from one viewport edge, rests at configurable snap
//! points, follows the pointer while dragged and settles with a flick-aware
//! resolver on release. Open drawers trap keyboard focus, stack with
//! increasing z-index, and can persist their state across sessions.
//!
//! The facade re-exports the member crates:
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`drawer_core`] | Directions, geometry, input events, the [`Environment`] capability |
//! | [`drawer_runtime`] | Observables, persistence backends, settle animation |
//! | [`drawer_widgets`] | [`Drawer`], its configuration, gestures, snapping, nesting |
//!
//! ```ignore
//! use drawer::prelude::*;
//!
//! let host = DrawerHost::new(env).with_storage(storage);
//! let mut sheet = Drawer::mount(
//!     DrawerConfig::new()
//!         .snap_points([0.25, 0.5, 0.9])
//!         .persist_state("settings"),
//!     DrawerSurface::new(content).with_handle(handle).with_overlay(overlay),
//!     host,
//! )?;
//! sheet.sync_open(true);
//! // Per frame:
//! let fraction = sheet.tick(now);
//! ```

pub use drawer_core;
pub use drawer_runtime;
pub use drawer_widgets;

pub use drawer_core::{
    Axis, Direction, ElementId, Environment, Event, KeyCode, KeyEvent, Modifiers, Point,
    PointerEvent, PointerEventKind, PointerId, SharedEnvironment,
};
pub use drawer_runtime::{
    Easing, MemoryStorage, Observable, SharedStorage, StorageBackend, StorageError, Subscription,
};
#[cfg(feature = "state-persistence")]
pub use drawer_runtime::FileStorage;
pub use drawer_widgets::{
    CloseReason, ConfigError, Drawer, DrawerConfig, DrawerHost, DrawerPhase, DrawerStack,
    DrawerSurface, DrawerTuning, PortalContainer,
};

/// Everything needed to mount and drive a drawer.
pub mod prelude {
    pub use crate::{
        CloseReason, ConfigError, Direction, Drawer, DrawerConfig, DrawerHost, DrawerPhase,
        DrawerSurface, ElementId, Environment, Event, Observable, Point, SharedEnvironment,
        SharedStorage,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn prelude_builds_a_config() {
        let config = DrawerConfig::new()
            .direction(Direction::Left)
            .snap_points([0.5f32]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn member_crates_are_reachable() {
        assert_eq!(crate::drawer_runtime::STORAGE_PREFIX, "drawer-");
        assert_eq!(crate::drawer_widgets::BASE_DRAWER_Z, 1000);
    }
}
