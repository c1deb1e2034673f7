#![forbid(unsafe_code)]

//! Change-tracked values for publishing drawer state.
//!
//! A drawer owns its canonical state. Consumers that want to follow it (a
//! label showing the current snap point, a parent mirroring `open` into its
//! own model) subscribe to the [`Observable`]s the drawer exposes instead of
//! polling.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` callbacks and cleaned up lazily during
//! notification.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. Callbacks run after the value is stored and the internal borrow is
//!    released, so a callback may read (or set) the same observable.

pub mod observable;

pub use observable::{Observable, Subscription};
