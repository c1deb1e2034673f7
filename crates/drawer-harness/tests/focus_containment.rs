#![forbid(unsafe_code)]

//! Keyboard focus containment while a drawer is open.
//!
//! # Focus Order Invariants
//!
//! 1. **Entry**: opening focuses the first tabbable element in the content,
//!    or the content itself when it has none.
//! 2. **Wrap-around**: Tab from the last element goes to the first; Shift+Tab
//!    from the first goes to the last.
//! 3. **Restore**: closing returns focus to the element focused before
//!    opening, if it is still attached. Otherwise focus is left alone.
//!
//! Run: `cargo test -p drawer-harness --test focus_containment`

use drawer_core::Environment;
use drawer_harness::Harness;
use drawer_widgets::DrawerConfig;

#[test]
fn opening_focuses_first_item() {
    let h = Harness::new();
    let dom = h.build_drawer(&["a", "b", "c"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();

    drawer.sync_open(true);
    assert_eq!(h.focused(), Some(dom.items[0]));
}

#[test]
fn tab_wraps_from_last_to_first() {
    let h = Harness::new();
    let dom = h.build_drawer(&["a", "b", "c"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();
    drawer.sync_open(true);
    let [a, b, c] = [dom.items[0], dom.items[1], dom.items[2]];

    assert!(h.tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(b));
    assert!(h.tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(c));
    assert!(h.tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(a));
}

#[test]
fn shift_tab_wraps_from_first_to_last() {
    let h = Harness::new();
    let dom = h.build_drawer(&["a", "b", "c"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();
    drawer.sync_open(true);

    assert_eq!(h.focused(), Some(dom.items[0]));
    assert!(h.shift_tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(dom.items[2]));
    assert!(h.shift_tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(dom.items[1]));
}

#[test]
fn tab_from_outside_the_list_enters_at_the_ends() {
    let h = Harness::new();
    let dom = h.build_drawer(&["a", "b"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();
    drawer.sync_open(true);

    // Focus escaped to the content root (e.g. a click on padding).
    h.doc.borrow_mut().make_focusable(dom.content);
    h.focus(dom.content);
    assert!(h.tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(dom.items[0]));

    h.focus(dom.content);
    assert!(h.shift_tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(dom.items[1]));
}

#[test]
fn closing_restores_previous_focus() {
    let h = Harness::new();
    let trigger = h.outside_button("trigger");
    h.focus(trigger);
    let dom = h.build_drawer(&["a", "b"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();

    drawer.sync_open(true);
    assert_eq!(h.focused(), Some(dom.items[0]));
    h.tab(&mut [&mut drawer]);

    drawer.sync_open(false);
    assert_eq!(h.focused(), Some(trigger));
}

#[test]
fn detached_trigger_is_not_restored() {
    let h = Harness::new();
    let trigger = h.outside_button("trigger");
    h.focus(trigger);
    let dom = h.build_drawer(&["a"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();
    drawer.sync_open(true);

    h.doc.borrow_mut().detach(trigger);
    drawer.sync_open(false);

    assert_eq!(h.focused(), Some(dom.items[0]));
    assert_ne!(h.focused(), Some(h.body()));
}

#[test]
fn nothing_focused_before_open_means_no_restore() {
    let h = Harness::new();
    let dom = h.build_drawer(&["a"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();
    drawer.sync_open(true);
    drawer.sync_open(false);

    assert_eq!(h.focused(), Some(dom.items[0]));
    assert_eq!(h.doc.borrow().focus_history(), &[dom.items[0]]);
}

#[test]
fn empty_content_takes_focus_itself() {
    let h = Harness::new();
    let dom = h.build_drawer(&[]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();

    drawer.sync_open(true);
    assert_eq!(h.focused(), Some(dom.content));
    assert!(h.doc.borrow().is_programmatically_focusable(dom.content));

    // Tab is still contained.
    assert!(h.tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), Some(dom.content));
}

#[test]
fn trap_disabled_leaves_focus_alone() {
    let h = Harness::new();
    let trigger = h.outside_button("trigger");
    h.focus(trigger);
    let dom = h.build_drawer(&["a"]);
    let mut drawer = h
        .mount(DrawerConfig::new().trap_focus(false), &dom)
        .unwrap();

    drawer.sync_open(true);
    assert_eq!(h.focused(), Some(trigger));
    assert!(!h.tab(&mut [&mut drawer]));
    // Still topmost for Escape purposes.
    assert!(drawer.is_topmost());
}

#[test]
fn closed_drawer_ignores_tab() {
    let h = Harness::new();
    let dom = h.build_drawer(&["a"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();
    assert!(!h.tab(&mut [&mut drawer]));
    assert_eq!(h.focused(), None);
}

#[test]
fn unmounting_an_open_drawer_restores_focus() {
    let h = Harness::new();
    let trigger = h.outside_button("trigger");
    h.focus(trigger);
    let dom = h.build_drawer(&["a"]);
    let mut drawer = h.mount(DrawerConfig::new(), &dom).unwrap();
    drawer.sync_open(true);

    drop(drawer);
    assert_eq!(h.focused(), Some(trigger));
    assert!(h.stack.is_empty());
}
