#![forbid(unsafe_code)]

//! Persisted drawer state across remounts.
//!
//! A "reload" is simulated by dropping the drawer and mounting a fresh one
//! in a new [`Harness`] that shares the old storage.
//!
//! # Failure Modes
//!
//! | Scenario | Expected |
//! |----------|----------|
//! | Storage unavailable | Drawer works, warning logged |
//! | Corrupt record | Treated as no record |
//! | Persisted snap point no longer configured | Default snap point, warning logged |
//! | Persistence disabled | Record cleared on unmount |
//!
//! Run: `cargo test -p drawer-harness --test persistence_roundtrip`

use std::rc::Rc;

use drawer_harness::Harness;
use drawer_runtime::{MemoryStorage, STORAGE_PREFIX};
use drawer_widgets::{ConfigError, DrawerConfig};
use tracing_test::traced_test;

const SNAPS: [f32; 3] = [0.25, 0.5, 0.9];

fn persisted(key: &str) -> DrawerConfig {
    DrawerConfig::new().snap_points(SNAPS).persist_state(key)
}

#[test]
fn open_state_round_trips_through_a_fresh_instance() {
    let storage = Rc::new(MemoryStorage::new());
    {
        let h = Harness::with_storage(Rc::clone(&storage));
        let dom = h.build_drawer(&["a"]);
        let mut drawer = h.mount(persisted("k"), &dom).unwrap();
        drawer.sync_open(true);
        drawer.sync_active_snap_point(Some(0.9)).unwrap();
    }
    assert_eq!(
        storage.raw("drawer-k").as_deref(),
        Some(r#"{"open":true,"snapPoint":0.9}"#)
    );

    let h = Harness::with_storage(Rc::clone(&storage));
    let dom = h.build_drawer(&["a"]);
    let mut drawer = h.mount(persisted("k"), &dom).unwrap();
    assert!(drawer.is_open());
    assert_eq!(drawer.active_snap_point(), Some(0.9));
    // Restored open, so focus containment is live immediately.
    assert_eq!(h.focused(), Some(dom.items[0]));

    drawer.sync_open(false);
    drop(drawer);

    let h = Harness::with_storage(Rc::clone(&storage));
    let dom = h.build_drawer(&[]);
    let drawer = h.mount(persisted("k"), &dom).unwrap();
    assert!(!drawer.is_open());
    assert_eq!(drawer.active_snap_point(), None);
}

#[test]
fn storage_key_uses_fixed_prefix() {
    let h = Harness::new();
    let dom = h.build_drawer(&[]);
    let mut drawer = h.mount(persisted("settings"), &dom).unwrap();
    drawer.sync_open(true);

    let key = format!("{STORAGE_PREFIX}settings");
    assert_eq!(key, "drawer-settings");
    assert!(h.storage.raw(&key).is_some());
}

#[test]
fn snap_point_can_be_left_out() {
    let h = Harness::new();
    let dom = h.build_drawer(&[]);
    let mut drawer = h
        .mount(persisted("k").persist_snap_point(false), &dom)
        .unwrap();
    drawer.sync_open(true);
    drawer.sync_active_snap_point(Some(0.5)).unwrap();
    assert_eq!(h.storage.raw("drawer-k").as_deref(), Some(r#"{"open":true}"#));
    drop(drawer);

    let h = Harness::with_storage(Rc::clone(&h.storage));
    let dom = h.build_drawer(&[]);
    let drawer = h.mount(persisted("k").persist_snap_point(false), &dom).unwrap();
    assert!(drawer.is_open());
    assert_eq!(drawer.active_snap_point(), Some(0.25));
}

#[test]
fn controlled_props_override_persisted_state() {
    let storage = Rc::new(MemoryStorage::new());
    storage.insert_raw("drawer-k", r#"{"open":true,"snapPoint":0.9}"#);

    let h = Harness::with_storage(Rc::clone(&storage));
    let dom = h.build_drawer(&[]);
    let drawer = h.mount(persisted("k").open(Some(false)), &dom).unwrap();
    assert!(!drawer.is_open());
    drop(drawer);

    let h = Harness::with_storage(Rc::clone(&storage));
    let dom = h.build_drawer(&[]);
    let drawer = h
        .mount(persisted("k").active_snap_point(Some(0.5)), &dom)
        .unwrap();
    assert!(drawer.is_open());
    assert_eq!(drawer.active_snap_point(), Some(0.5));
}

#[test]
fn missing_key_fails_mount() {
    let h = Harness::new();
    let dom = h.build_drawer(&[]);
    let err = h
        .mount(DrawerConfig::new().persist_enabled(true), &dom)
        .unwrap_err();
    assert_eq!(err, ConfigError::MissingPersistKey);
}

#[traced_test]
#[test]
fn unknown_persisted_snap_point_falls_back_to_default() {
    let h = Harness::new();
    h.storage
        .insert_raw("drawer-k", r#"{"open":true,"snapPoint":0.7}"#);
    let dom = h.build_drawer(&[]);
    let drawer = h.mount(persisted("k"), &dom).unwrap();

    assert!(drawer.is_open());
    assert_eq!(drawer.active_snap_point(), Some(0.25));
    assert!(logs_contain("Ignoring persisted snap point"));
}

#[traced_test]
#[test]
fn corrupt_record_is_ignored() {
    let h = Harness::new();
    h.storage.insert_raw("drawer-k", "not json");
    let dom = h.build_drawer(&[]);
    let drawer = h
        .mount(persisted("k").default_open(true), &dom)
        .unwrap();

    assert!(drawer.is_open());
    assert_eq!(drawer.active_snap_point(), Some(0.25));
    assert!(logs_contain("Failed to load drawer state"));
}

#[traced_test]
#[test]
fn unavailable_storage_never_breaks_the_drawer() {
    let h = Harness::new();
    h.storage.set_available(false);
    let dom = h.build_drawer(&[]);
    let mut drawer = h.mount(persisted("k"), &dom).unwrap();

    drawer.sync_open(true);
    drawer.sync_active_snap_point(Some(0.5)).unwrap();
    assert!(drawer.is_open());
    assert_eq!(drawer.active_snap_point(), Some(0.5));
    assert!(logs_contain("Failed to save drawer state"));
}

#[traced_test]
#[test]
fn quota_failure_keeps_in_memory_state() {
    let storage = Rc::new(MemoryStorage::with_quota(4));
    let h = Harness::with_storage(storage);
    let dom = h.build_drawer(&[]);
    let mut drawer = h.mount(persisted("k"), &dom).unwrap();

    drawer.sync_open(true);
    assert!(drawer.is_open());
    assert!(h.storage.is_empty());
    assert!(logs_contain("Failed to save drawer state"));
}

#[test]
fn disabled_persistence_clears_record_on_unmount() {
    let h = Harness::new();
    h.storage.insert_raw("drawer-k", r#"{"open":true}"#);
    let dom = h.build_drawer(&[]);
    let mut drawer = h
        .mount(persisted("k").persist_enabled(false), &dom)
        .unwrap();

    // Not restored, not written.
    assert!(!drawer.is_open());
    drawer.sync_open(true);
    assert_eq!(h.storage.raw("drawer-k").as_deref(), Some(r#"{"open":true}"#));

    drop(drawer);
    assert_eq!(h.storage.raw("drawer-k"), None);
}

#[test]
fn enabled_persistence_keeps_record_on_unmount() {
    let h = Harness::new();
    let dom = h.build_drawer(&[]);
    let mut drawer = h.mount(persisted("k"), &dom).unwrap();
    drawer.sync_open(true);
    drop(drawer);
    assert!(h.storage.raw("drawer-k").is_some());
}

#[cfg(feature = "state-persistence")]
#[test]
fn file_storage_survives_process_restart() {
    use drawer_runtime::{FileStorage, SharedStorage};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drawers.json");

    let mount = |open: Option<bool>| {
        let h = Harness::new();
        let storage: SharedStorage = Rc::new(FileStorage::new(&path));
        let dom = h.build_drawer(&[]);
        let host = h.host().with_storage(storage);
        let config = persisted("files").open(open);
        let drawer = drawer_widgets::Drawer::mount(config, dom.surface(), host).unwrap();
        (h, drawer)
    };

    {
        let (_h, mut drawer) = mount(None);
        drawer.sync_open(true);
        drawer.sync_active_snap_point(Some(0.5)).unwrap();
    }
    let (_h, drawer) = mount(None);
    assert!(drawer.is_open());
    assert_eq!(drawer.active_snap_point(), Some(0.5));
}
