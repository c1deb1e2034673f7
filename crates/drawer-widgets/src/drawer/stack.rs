#![forbid(unsafe_code)]

//! Stack of open drawers for nested z-ordering and input priority.
//!
//! Every open drawer has an entry, pushed when it opens and removed when it
//! closes. The last entry is the topmost drawer: only it reacts to Escape,
//! overlay clicks and Tab containment.
//!
//! Drawers join the stack through
//! [`FocusContainment::activate`](super::FocusContainment::activate) and leave
//! it through [`FocusContainment::deactivate`](super::FocusContainment::deactivate);
//! the stack itself is only queried by drawers.
//!
//! # Invariants
//!
//! - Z-order is strictly increasing: later entries are always on top.
//! - An id appears at most once.
//! - Close ordering is LIFO in the common case; `pop_id` removes from any
//!   position (an outer drawer closed while an inner one is open).
//! - Each entry carries the element focus returns to when it closes. An
//!   entry removed from below the top hands its restore target to the entry
//!   directly above it, so the chain still ends at the element focused
//!   before the outermost drawer opened.
//!
//! # Failure Modes
//!
//! - `pop_id()` for an id not in the stack returns `None`.
//! - `z_index()` for an id not in the stack returns `None`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use drawer_core::ElementId;

/// Base z-index for the drawer layer.
pub const BASE_DRAWER_Z: u32 = 1000;

/// Z-index increment between stacked drawers.
const Z_INCREMENT: u32 = 10;

static DRAWER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static GLOBAL_STACK: DrawerStack = DrawerStack::new();
}

/// Unique identifier of a mounted drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawerId(u64);

impl DrawerId {
    pub(crate) fn next() -> Self {
        Self(DRAWER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct StackEntry {
    id: DrawerId,
    z_index: u32,
    restore_to: Option<ElementId>,
}

/// An entry removed by [`DrawerStack::pop_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoppedEntry {
    /// Whether the entry was the topmost one.
    pub was_top: bool,
    /// Where focus should return. Always `None` when the entry was not on
    /// top: its target moved to the entry above.
    pub restore_to: Option<ElementId>,
}

#[derive(Debug, Default)]
struct StackInner {
    entries: Vec<StackEntry>,
    next_z: u32,
}

/// Shared handle to a stack of open drawers.
///
/// Clones share the same stack. Use [`DrawerStack::global`] for the
/// per-thread document stack or [`DrawerStack::new`] for an isolated one.
#[derive(Debug, Clone, Default)]
pub struct DrawerStack {
    inner: Rc<RefCell<StackInner>>,
}

impl DrawerStack {
    /// An empty, unshared stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stack shared by every drawer on this thread.
    pub fn global() -> Self {
        GLOBAL_STACK.with(Clone::clone)
    }

    /// Whether two handles refer to the same stack.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Put `id` on top. Re-pushing an id moves it to the top with a fresh
    /// z-index. Returns the assigned z-index.
    pub(crate) fn push(&self, id: DrawerId) -> u32 {
        let mut inner = self.inner.borrow_mut();
        inner.entries.retain(|e| e.id != id);
        if inner.entries.is_empty() {
            inner.next_z = 0;
        }
        let z_index = BASE_DRAWER_Z + inner.next_z;
        inner.next_z += Z_INCREMENT;
        inner.entries.push(StackEntry {
            id,
            z_index,
            restore_to: None,
        });
        z_index
    }

    /// Record where focus returns when `id` closes.
    pub(crate) fn set_restore_target(&self, id: DrawerId, target: Option<ElementId>) {
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.entries.iter_mut().find(|e| e.id == id) {
            entry.restore_to = target;
        }
    }

    /// Remove `id` from any position.
    pub(crate) fn pop_id(&self, id: DrawerId) -> Option<PoppedEntry> {
        let mut inner = self.inner.borrow_mut();
        let idx = inner.entries.iter().position(|e| e.id == id)?;
        let removed = inner.entries.remove(idx);
        match inner.entries.get_mut(idx) {
            Some(above) => {
                above.restore_to = removed.restore_to;
                Some(PoppedEntry {
                    was_top: false,
                    restore_to: None,
                })
            }
            None => Some(PoppedEntry {
                was_top: true,
                restore_to: removed.restore_to,
            }),
        }
    }

    /// Id of the topmost open drawer.
    pub fn top_id(&self) -> Option<DrawerId> {
        self.inner.borrow().entries.last().map(|e| e.id)
    }

    pub fn is_top(&self, id: DrawerId) -> bool {
        self.top_id() == Some(id)
    }

    pub fn depth(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn contains(&self, id: DrawerId) -> bool {
        self.inner.borrow().entries.iter().any(|e| e.id == id)
    }

    /// Z-index assigned when `id` was pushed.
    pub fn z_index(&self, id: DrawerId) -> Option<u32> {
        self.inner
            .borrow()
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.z_index)
    }

    /// Element focus returns to when `id` closes.
    pub fn restore_target(&self, id: DrawerId) -> Option<ElementId> {
        self.inner
            .borrow()
            .entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.restore_to)
    }

    /// Open drawers, bottom to top.
    pub fn ids(&self) -> Vec<DrawerId> {
        self.inner.borrow().entries.iter().map(|e| e.id).collect()
    }
}
