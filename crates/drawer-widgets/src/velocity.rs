#![forbid(unsafe_code)]

//! Release velocity estimation for drag gestures.
//!
//! The tracker keeps a bounded history of `(time, position)` samples along the
//! drag axis and fits a least-squares line through the recent ones. The slope
//! of that line is the release velocity.
//!
//! # Invariants
//!
//! 1. At most `capacity` samples are retained; the oldest is evicted first.
//! 2. Samples older than `window` (relative to the newest) never contribute.
//! 3. Walking back from the newest sample, a gap longer than `assume_stopped`
//!    ends the fit: the pointer paused there, so older motion is stale.
//! 4. Fewer than two usable samples yields a velocity of `0.0`.

use std::collections::VecDeque;

use web_time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Instant,
    position: f32,
}

/// Bounded sample history with a least-squares velocity fit.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
    capacity: usize,
    window: Duration,
    assume_stopped: Duration,
}

impl VelocityTracker {
    /// Create a tracker. `capacity` is clamped to at least 2.
    pub fn new(capacity: usize, window: Duration, assume_stopped: Duration) -> Self {
        let capacity = capacity.max(2);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            window,
            assume_stopped,
        }
    }

    /// Record a position. Timestamps earlier than the newest sample are
    /// treated as simultaneous with it.
    pub fn add(&mut self, at: Instant, position: f32) {
        let at = match self.samples.back() {
            Some(last) if at < last.at => last.at,
            _ => at,
        };
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { at, position });

        while let Some(front) = self.samples.front() {
            if at.saturating_duration_since(front.at) > self.window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the newest sample.
    pub fn last_sample_at(&self) -> Option<Instant> {
        self.samples.back().map(|sample| sample.at)
    }

    /// Velocity in position units per second.
    pub fn velocity(&self) -> f32 {
        let Some(newest) = self.samples.back().copied() else {
            return 0.0;
        };

        // (seconds before newest, position), newest first.
        let mut points: Vec<(f32, f32)> = Vec::with_capacity(self.samples.len());
        let mut newer = newest;
        for sample in self.samples.iter().rev() {
            let age = newest.at.saturating_duration_since(sample.at);
            let gap = newer.at.saturating_duration_since(sample.at);
            if age > self.window || gap > self.assume_stopped {
                break;
            }
            points.push((-age.as_secs_f32(), sample.position));
            newer = *sample;
        }

        if points.len() < 2 {
            return 0.0;
        }

        let n = points.len() as f32;
        let mean_t = points.iter().map(|(t, _)| t).sum::<f32>() / n;
        let mean_x = points.iter().map(|(_, x)| x).sum::<f32>() / n;
        let (mut num, mut den) = (0.0f32, 0.0f32);
        for (t, x) in &points {
            let dt = t - mean_t;
            num += dt * (x - mean_x);
            den += dt * dt;
        }
        if den <= f32::EPSILON {
            return 0.0;
        }
        let slope = num / den;
        if slope.is_finite() { slope } else { 0.0 }
    }

    /// Velocity as seen at `now`: zero if the pointer has been still for
    /// longer than the stop threshold.
    pub fn velocity_at(&self, now: Instant) -> f32 {
        match self.last_sample_at() {
            Some(last) if now.saturating_duration_since(last) <= self.assume_stopped => {
                self.velocity()
            }
            _ => 0.0,
        }
    }
}
