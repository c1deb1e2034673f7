#![forbid(unsafe_code)]

//! Settle animation between drawer resting positions.
//!
//! A [`SettleAnimation`] interpolates a single scalar (the drawer's visible
//! fraction) toward a target over a fixed duration. It is sampled, not
//! ticked: callers pass the current time to [`SettleAnimation::value_at`], so
//! the result is deterministic under a test clock.
//!
//! # Invariants
//!
//! 1. At most one transition is in flight. [`SettleAnimation::animate_to`]
//!    replaces the running one.
//! 2. A replacement starts from the value the old transition had reached at
//!    that instant, so the sampled value is continuous across retargets.
//! 3. Once `now >= start + duration`, the value is exactly the target.

use web_time::{Duration, Instant};

/// Easing curves for settle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseOut,
    /// Material "standard" curve: fast start, long gentle landing.
    #[default]
    FastOutSlowIn,
}

impl Easing {
    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn transform(self, fraction: f32) -> f32 {
        match self {
            Self::Linear => fraction.clamp(0.0, 1.0),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, fraction),
            Self::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, fraction),
        }
    }
}

/// Evaluate the CSS-style cubic bezier `(0,0) (x1,y1) (x2,y2) (1,1)` at
/// horizontal position `x`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let coefficients = |p1: f32, p2: f32| {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        (a, b, c)
    };
    let (ax, bx, cx) = coefficients(x1, x2);
    let (ay, by, cy) = coefficients(y1, y2);
    let sample = |a: f32, b: f32, c: f32, t: f32| ((a * t + b) * t + c) * t;
    let slope = |a: f32, b: f32, c: f32, t: f32| (3.0 * a * t + 2.0 * b) * t + c;

    // Newton's method on the x polynomial, bisection when the slope flattens.
    let mut t = x;
    for _ in 0..8 {
        let err = sample(ax, bx, cx, t) - x;
        if err.abs() < 1e-6 {
            return sample(ay, by, cy, t);
        }
        let d = slope(ax, bx, cx, t);
        if d.abs() < 1e-6 {
            break;
        }
        t = (t - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    t = x;
    for _ in 0..24 {
        let err = sample(ax, bx, cx, t) - x;
        if err.abs() < 1e-6 {
            break;
        }
        if err > 0.0 {
            hi = t;
        } else {
            lo = t;
        }
        t = 0.5 * (lo + hi);
    }
    sample(ay, by, cy, t)
}

/// Duration and curve of a settle transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleSpec {
    pub duration: Duration,
    pub easing: Easing,
}

impl SettleSpec {
    /// A transition of `duration` with the given curve.
    pub const fn new(duration: Duration, easing: Easing) -> Self {
        Self { duration, easing }
    }

    /// Zero-length transitions: every retarget lands immediately.
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO, Easing::Linear)
    }
}

impl Default for SettleSpec {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Easing::FastOutSlowIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: f32,
    started: Instant,
}

/// A retargetable scalar tween.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleAnimation {
    spec: SettleSpec,
    target: f32,
    transition: Option<Transition>,
}

impl SettleAnimation {
    /// An animation resting at `value`.
    pub fn new(spec: SettleSpec, value: f32) -> Self {
        Self {
            spec,
            target: value,
            transition: None,
        }
    }

    /// The transition spec.
    pub fn spec(&self) -> SettleSpec {
        self.spec
    }

    /// Where the animation is heading (or resting).
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Sample the value at `now`.
    pub fn value_at(&self, now: Instant) -> f32 {
        let Some(transition) = self.transition else {
            return self.target;
        };
        let progress = self.progress(transition, now);
        let eased = self.spec.easing.transform(progress);
        transition.from + (self.target - transition.from) * eased
    }

    /// Whether a transition is still moving at `now`.
    pub fn is_running(&self, now: Instant) -> bool {
        self.transition
            .is_some_and(|transition| self.progress(transition, now) < 1.0)
    }

    /// Start moving toward `target` from wherever the animation is at `now`.
    ///
    /// Any in-flight transition is abandoned.
    pub fn animate_to(&mut self, target: f32, now: Instant) {
        let from = self.value_at(now);
        self.target = target;
        if self.spec.duration.is_zero() || (from - target).abs() < f32::EPSILON {
            self.transition = None;
        } else {
            self.transition = Some(Transition { from, started: now });
        }
    }

    /// Jump to `value` with no transition.
    pub fn snap_to(&mut self, value: f32) {
        self.target = value;
        self.transition = None;
    }

    /// Drop a finished transition. Returns the settled value if the animation
    /// is at rest after the call.
    pub fn settle(&mut self, now: Instant) -> Option<f32> {
        if self.is_running(now) {
            return None;
        }
        self.transition = None;
        Some(self.target)
    }

    fn progress(&self, transition: Transition, now: Instant) -> f32 {
        let duration = self.spec.duration;
        if duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(transition.started);
        (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
    }
}
