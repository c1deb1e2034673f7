#![forbid(unsafe_code)]

//! Focus containment for open drawers.
//!
//! While a drawer is open its [`FocusContainment`] holds an entry in the
//! [`DrawerStack`]. The topmost entry owns the keyboard: Tab and Shift-Tab
//! cycle through the focusable descendants of its content root and wrap at
//! both ends.
//!
//! # Lifecycle
//!
//! 1. `activate(root)`: remember the focused element if it lies outside
//!    `root`, push onto the stack, move focus to the first focusable
//!    descendant (or to `root` itself, made focusable, when there is none).
//! 2. `handle_tab(backwards)`: cycle focus inside `root` if this drawer is
//!    topmost.
//! 3. `deactivate()`: leave the stack and return focus to the remembered
//!    element if it is still attached. An outer drawer below becomes topmost
//!    again and regains containment. A drawer closed from below the top
//!    leaves focus alone and hands its remembered element to the drawer
//!    above it.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Remembered element detached before close | No focus change |
//! | Nothing focused before open | No focus change on close |
//! | Closed while not topmost | No focus change; restore target passed up |
//! | `activate` while active | No-op |
//! | `deactivate` while inactive | No-op |
//!
//! With trapping disabled the containment still joins the stack (so Escape
//! priority holds) but never moves focus or intercepts Tab.

use drawer_core::{ElementId, SharedEnvironment};

use super::stack::{DrawerId, DrawerStack};

/// Keyboard focus confinement for one drawer.
pub struct FocusContainment {
    id: DrawerId,
    env: SharedEnvironment,
    stack: DrawerStack,
    trap: bool,
    root: Option<ElementId>,
}

impl std::fmt::Debug for FocusContainment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusContainment")
            .field("id", &self.id)
            .field("trap", &self.trap)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FocusContainment {
    /// Containment for drawer `id`. `trap` enables focus moves and Tab
    /// cycling.
    pub fn new(id: DrawerId, env: SharedEnvironment, stack: DrawerStack, trap: bool) -> Self {
        Self {
            id,
            env,
            stack,
            trap,
            root: None,
        }
    }

    /// Begin containment inside `root`.
    pub fn activate(&mut self, root: ElementId) {
        if self.root.is_some() {
            return;
        }
        self.root = Some(root);
        let z_index = self.stack.push(self.id);
        tracing::debug!(drawer = self.id.id(), z_index, "focus containment activated");
        if !self.trap {
            return;
        }

        let mut env = self.env.borrow_mut();
        let restore_to = env
            .active_element()
            .filter(|&focused| !env.contains(root, focused));
        self.stack.set_restore_target(self.id, restore_to);
        let first = env.focusable_descendants(root).into_iter().next();
        match first {
            Some(element) => {
                env.focus(element);
            }
            None => {
                env.make_focusable(root);
                env.focus(root);
            }
        }
    }

    /// End containment and restore prior focus.
    pub fn deactivate(&mut self) {
        if self.root.take().is_none() {
            return;
        }
        let Some(popped) = self.stack.pop_id(self.id) else {
            return;
        };
        tracing::debug!(
            drawer = self.id.id(),
            was_top = popped.was_top,
            "focus containment deactivated"
        );
        // Below the top: the drawer above keeps focus.
        let Some(previous) = popped.restore_to else {
            return;
        };
        let Ok(mut env) = self.env.try_borrow_mut() else {
            return;
        };
        if env.is_attached(previous) {
            env.focus(previous);
        } else {
            tracing::trace!(drawer = self.id.id(), "focus restore target detached");
        }
    }

    /// Move focus for a Tab press. Returns `true` if the key was consumed.
    pub fn handle_tab(&mut self, backwards: bool) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        if !self.trap || !self.is_topmost() {
            return false;
        }

        let mut env = self.env.borrow_mut();
        let focusable = env.focusable_descendants(root);
        if focusable.is_empty() {
            env.focus(root);
            return true;
        }
        let last = focusable.len() - 1;
        let current = env
            .active_element()
            .and_then(|focused| focusable.iter().position(|&e| e == focused));
        let next = match (current, backwards) {
            (None, false) => 0,
            (None, true) => last,
            (Some(i), false) if i == last => 0,
            (Some(i), false) => i + 1,
            (Some(0), true) => last,
            (Some(i), true) => i - 1,
        };
        env.focus(focusable[next]);
        true
    }

    /// Whether containment is active.
    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    /// Whether this drawer owns the keyboard.
    pub fn is_topmost(&self) -> bool {
        self.is_active() && self.stack.is_top(self.id)
    }

    /// The element focus returns to on deactivation.
    pub fn restore_target(&self) -> Option<ElementId> {
        self.stack.restore_target(self.id)
    }

    pub fn id(&self) -> DrawerId {
        self.id
    }

    pub fn stack(&self) -> &DrawerStack {
        &self.stack
    }
}

impl Drop for FocusContainment {
    fn drop(&mut self) {
        self.deactivate();
    }
}
