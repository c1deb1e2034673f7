#![forbid(unsafe_code)]

//! Runtime support for draggable drawers.
//!
//! - [`reactive`]: version-tracked [`Observable`] values a drawer publishes its
//!   committed state through.
//! - [`persistence`]: best-effort storage of `{open, snapPoint}` records.
//! - [`animation`]: the retargetable settle tween that moves a drawer between
//!   resting positions.

pub mod animation;
pub mod persistence;
pub mod reactive;

pub use animation::{Easing, SettleAnimation, SettleSpec};
#[cfg(feature = "state-persistence")]
pub use persistence::FileStorage;
pub use persistence::{
    DrawerPersistence, MemoryStorage, PersistKey, PersistedRecord, STORAGE_PREFIX,
    SharedStorage, StorageBackend, StorageError,
};
pub use reactive::{Observable, Subscription};
