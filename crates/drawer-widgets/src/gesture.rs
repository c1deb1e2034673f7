#![forbid(unsafe_code)]

//! Pointer-drag tracking along a drawer's axis.
//!
//! [`GestureTracker`] turns raw pointer positions into a signed drag offset
//! (pixels, positive toward closed) and, on release, a [`GestureOutcome`]
//! carrying the final offset and release velocity. It does not decide where
//! the drawer settles; that is the snap resolver's job.
//!
//! # Invariants
//!
//! 1. At most one gesture is active. `begin` while active is rejected.
//! 2. Only the pointer that began the gesture can update, end or cancel it.
//! 3. The reported offset always lies within the [`OffsetBounds`] supplied to
//!    `begin`: the drawer cannot be dragged past fully closed or past fully
//!    open.
//! 4. After `end` or `cancel` the tracker is idle and its samples are gone.
//!
//! # Failure Modes
//!
//! | Condition | Result |
//! |-----------|--------|
//! | `begin` while a gesture is active | `false`, no state change |
//! | `update`/`end` from another pointer | `None`, no state change |
//! | Non-finite pointer position | Sample ignored |

use drawer_core::{Direction, Point, PointerId};
use web_time::Instant;

use crate::velocity::VelocityTracker;

/// Allowed range of the drag offset, in pixels.
///
/// `min` is the (non-positive) limit of opening motion, `max` the
/// (non-negative) limit of closing motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetBounds {
    pub min: f32,
    pub max: f32,
}

impl OffsetBounds {
    /// Bounds for a drag starting with `fraction` of an `extent`-sized drawer
    /// visible: it may close by the visible part and open by the rest.
    pub fn for_resting(fraction: f32, extent: f32) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let extent = extent.max(0.0);
        Self {
            min: -(1.0 - fraction) * extent,
            max: fraction * extent,
        }
    }

    /// Clamp an offset into the bounds.
    #[inline]
    pub fn clamp(self, offset: f32) -> f32 {
        offset.clamp(self.min, self.max)
    }
}

/// Result of a completed gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutcome {
    /// Pointer that performed the gesture.
    pub pointer: PointerId,
    /// Clamped drag offset at release, pixels, positive toward closed.
    pub final_offset: f32,
    /// Release velocity, pixels per second, positive toward closed.
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy)]
struct ActiveGesture {
    pointer: PointerId,
    origin: Point,
    bounds: OffsetBounds,
    offset: f32,
}

/// Single-pointer drag tracker.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    direction: Direction,
    active: Option<ActiveGesture>,
    velocity: VelocityTracker,
}

impl GestureTracker {
    /// Track drags along `direction`'s axis using `velocity` for release
    /// speed.
    pub fn new(direction: Direction, velocity: VelocityTracker) -> Self {
        Self {
            direction,
            active: None,
            velocity,
        }
    }

    /// Start a gesture. Returns `false` if one is already in progress.
    pub fn begin(
        &mut self,
        pointer: PointerId,
        start: Point,
        at: Instant,
        bounds: OffsetBounds,
    ) -> bool {
        if let Some(active) = self.active {
            tracing::trace!(
                active = active.pointer.0,
                rejected = pointer.0,
                "drag already in progress"
            );
            return false;
        }
        if !start.is_finite() {
            return false;
        }
        self.velocity.clear();
        self.velocity.add(at, 0.0);
        self.active = Some(ActiveGesture {
            pointer,
            origin: start,
            bounds,
            offset: 0.0,
        });
        true
    }

    /// Feed a pointer position. Returns the new clamped offset, or `None` if
    /// the sample does not belong to the active gesture.
    pub fn update(&mut self, pointer: PointerId, position: Point, at: Instant) -> Option<f32> {
        let active = self.active.as_mut().filter(|a| a.pointer == pointer)?;
        if !position.is_finite() {
            return Some(active.offset);
        }
        let raw = self.direction.project(position - active.origin);
        active.offset = active.bounds.clamp(raw);
        self.velocity.add(at, raw);
        Some(active.offset)
    }

    /// Finish the gesture and report its outcome.
    pub fn end(&mut self, pointer: PointerId, at: Instant) -> Option<GestureOutcome> {
        let active = self.active.filter(|a| a.pointer == pointer)?;
        self.active = None;
        let velocity = self.velocity.velocity_at(at);
        self.velocity.clear();
        Some(GestureOutcome {
            pointer,
            final_offset: active.offset,
            velocity,
        })
    }

    /// Abandon the gesture. Returns the pointer that was dragging.
    pub fn cancel(&mut self) -> Option<PointerId> {
        let active = self.active.take()?;
        self.velocity.clear();
        Some(active.pointer)
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer driving the active gesture.
    pub fn pointer(&self) -> Option<PointerId> {
        self.active.map(|a| a.pointer)
    }

    /// Current clamped offset, `0.0` when idle.
    pub fn offset(&self) -> f32 {
        self.active.map_or(0.0, |a| a.offset)
    }

    /// Bounds of the active gesture.
    pub fn bounds(&self) -> Option<OffsetBounds> {
        self.active.map(|a| a.bounds)
    }
}
