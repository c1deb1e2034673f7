#![forbid(unsafe_code)]

//! Snap-point resolution: where a released drawer comes to rest.
//!
//! The candidates are the configured snap fractions plus `0.0` (closed). A
//! drawer without snap points has the candidates `{0.0, 1.0}`.
//!
//! ```text
//!  closed            snap points               fully open
//!    0 ─────────── 0.25 ───── 0.5 ──────── 0.9 ───── 1
//!                     ▲ current   ▲ release
//! ```
//!
//! Two rules, picked by release speed:
//!
//! - **Flick** (`|velocity| > flick_velocity`): advance to the first candidate
//!   strictly beyond both the current snap point and the release position in
//!   the direction of motion. When nothing lies beyond, the extreme candidate
//!   in that direction wins.
//! - **Drift**: the candidate nearest the release position. Distances within
//!   `tie_epsilon` are ties, broken toward the candidate nearest the current
//!   snap point.
//!
//! # Invariants
//!
//! 1. The result is always a candidate: `Closed`, or `Open(f)` with `f` a
//!    configured snap point (`1.0` when none are configured).
//! 2. Resolution is pure: same inputs, same output.

/// Where a released drawer settles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapTarget {
    Closed,
    /// Open with this fraction of the drawer visible.
    Open(f32),
}

impl SnapTarget {
    /// Visible fraction at rest.
    pub fn fraction(self) -> f32 {
        match self {
            Self::Closed => 0.0,
            Self::Open(f) => f,
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Thresholds for [`SnapResolver::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResolver {
    /// Release speed above which a release is a flick, in drawer extents per
    /// second.
    pub flick_velocity: f32,
    /// Distances closer than this compare equal.
    pub tie_epsilon: f32,
}

impl Default for SnapResolver {
    fn default() -> Self {
        Self {
            flick_velocity: 0.5,
            tie_epsilon: 1e-4,
        }
    }
}

impl SnapResolver {
    /// Resolve a release.
    ///
    /// - `release`: visible fraction at release.
    /// - `velocity`: release speed in extents per second, positive while
    ///   opening.
    /// - `snap_points`: strictly increasing fractions in `(0, 1]`, possibly
    ///   empty.
    /// - `current`: visible fraction the drawer rested at before the drag.
    pub fn resolve(
        &self,
        release: f32,
        velocity: f32,
        snap_points: &[f32],
        current: f32,
    ) -> SnapTarget {
        let mut candidates = Vec::with_capacity(snap_points.len() + 1);
        candidates.push(0.0);
        if snap_points.is_empty() {
            candidates.push(1.0);
        } else {
            candidates.extend_from_slice(snap_points);
        }
        let release = if release.is_finite() {
            release.clamp(0.0, 1.0)
        } else {
            current
        };
        let velocity = if velocity.is_finite() { velocity } else { 0.0 };

        let chosen = if velocity > self.flick_velocity {
            let anchor = current.max(release);
            candidates
                .iter()
                .copied()
                .find(|&c| c > anchor + self.tie_epsilon)
                .unwrap_or(candidates[candidates.len() - 1])
        } else if velocity < -self.flick_velocity {
            let anchor = current.min(release);
            candidates
                .iter()
                .rev()
                .copied()
                .find(|&c| c < anchor - self.tie_epsilon)
                .unwrap_or(0.0)
        } else {
            self.nearest(&candidates, release, current)
        };

        if chosen <= 0.0 {
            SnapTarget::Closed
        } else {
            SnapTarget::Open(chosen)
        }
    }

    fn nearest(&self, candidates: &[f32], release: f32, current: f32) -> f32 {
        let mut best = candidates[0];
        let mut best_distance = (best - release).abs();
        for &candidate in &candidates[1..] {
            let distance = (candidate - release).abs();
            let closer = distance < best_distance - self.tie_epsilon;
            let tied = (distance - best_distance).abs() <= self.tie_epsilon;
            if closer || (tied && (candidate - current).abs() < (best - current).abs()) {
                best = candidate;
                best_distance = distance;
            }
        }
        best
    }
}
