#![forbid(unsafe_code)]

//! Drawer configuration and validation.
//!
//! A [`DrawerConfig`] is built with consuming setters and validated once by
//! [`Drawer::mount`](super::Drawer::mount). Misconfiguration is a programming
//! error on the integrator's side, so it fails mount with a [`ConfigError`]
//! rather than degrading at runtime.
//!
//! # Example
//!
//! ```ignore
//! let config = DrawerConfig::new()
//!     .direction(Direction::Bottom)
//!     .snap_points([0.25, 0.5, 0.9])
//!     .persist_state("settings")
//!     .on_open_change(|open| println!("open: {open}"));
//! ```

use core::fmt;

use drawer_core::{Direction, ElementId};
use drawer_runtime::{Easing, SettleSpec};
use web_time::Duration;

use crate::snap::SnapResolver;
use crate::velocity::VelocityTracker;

/// Snap points closer than this are the same snap point.
const SNAP_MATCH_EPSILON: f32 = 1e-6;

/// Named gesture and animation constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawerTuning {
    /// Release speed, in drawer extents per second, above which a release is
    /// a flick.
    pub flick_velocity: f32,
    /// Only samples this recent contribute to the release velocity.
    pub velocity_window: Duration,
    /// A pause this long between samples means the pointer stopped.
    pub assume_stopped: Duration,
    /// Size of the velocity sample ring.
    pub sample_capacity: usize,
    /// Duration of open, close and snap transitions.
    pub settle_duration: Duration,
    pub settle_easing: Easing,
    /// Snap distances closer than this are ties.
    pub tie_epsilon: f32,
}

impl Default for DrawerTuning {
    fn default() -> Self {
        Self {
            flick_velocity: 0.5,
            velocity_window: Duration::from_millis(100),
            assume_stopped: Duration::from_millis(40),
            sample_capacity: 20,
            settle_duration: Duration::from_millis(300),
            settle_easing: Easing::FastOutSlowIn,
            tie_epsilon: 1e-4,
        }
    }
}

impl DrawerTuning {
    pub(crate) fn resolver(&self) -> SnapResolver {
        SnapResolver {
            flick_velocity: self.flick_velocity,
            tie_epsilon: self.tie_epsilon,
        }
    }

    pub(crate) fn velocity_tracker(&self) -> VelocityTracker {
        VelocityTracker::new(
            self.sample_capacity,
            self.velocity_window,
            self.assume_stopped,
        )
    }

    pub(crate) fn settle_spec(&self) -> SettleSpec {
        SettleSpec::new(self.settle_duration, self.settle_easing)
    }
}

/// Where portalled content is mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalContainer {
    Element(ElementId),
    /// Resolved with the environment's selector query at mount.
    Selector(String),
}

impl From<ElementId> for PortalContainer {
    fn from(element: ElementId) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for PortalContainer {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

/// Configuration errors reported by [`Drawer::mount`](super::Drawer::mount).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A snap point is not a fraction in `(0, 1]`.
    SnapPointOutOfRange { index: usize, value: f32 },
    /// Snap points must be strictly increasing.
    SnapPointsNotIncreasing { index: usize, previous: f32, value: f32 },
    /// A snap point is NaN or infinite.
    NonFiniteSnapPoint { index: usize },
    /// The requested active snap point is not one of the snap points.
    ActiveSnapPointNotInSnapPoints { value: f32 },
    /// State persistence was requested without a persist key.
    MissingPersistKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SnapPointOutOfRange { index, value } => {
                write!(f, "snap point {index} ({value}) is outside (0, 1]")
            }
            Self::SnapPointsNotIncreasing {
                index,
                previous,
                value,
            } => write!(
                f,
                "snap point {index} ({value}) is not greater than the previous one ({previous})"
            ),
            Self::NonFiniteSnapPoint { index } => write!(f, "snap point {index} is not finite"),
            Self::ActiveSnapPointNotInSnapPoints { value } => {
                write!(f, "active snap point {value} is not one of the snap points")
            }
            Self::MissingPersistKey => f.write_str("persist_state requires a non-empty persist key"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A validated, strictly increasing list of snap fractions in `(0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapPoints {
    points: Vec<f32>,
}

impl SnapPoints {
    /// Validate a list of snap fractions.
    pub fn new(points: impl Into<Vec<f32>>) -> Result<Self, ConfigError> {
        let points = points.into();
        for (index, &value) in points.iter().enumerate() {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteSnapPoint { index });
            }
            if value <= 0.0 || value > 1.0 {
                return Err(ConfigError::SnapPointOutOfRange { index, value });
            }
            if index > 0 && value <= points[index - 1] {
                return Err(ConfigError::SnapPointsNotIncreasing {
                    index,
                    previous: points[index - 1],
                    value,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The smallest snap point, the default resting position when opening.
    pub fn first(&self) -> Option<f32> {
        self.points.first().copied()
    }

    /// The configured snap point matching `value`, if any.
    pub fn find(&self, value: f32) -> Option<f32> {
        self.points
            .iter()
            .copied()
            .find(|p| (p - value).abs() <= SNAP_MATCH_EPSILON)
    }

    pub fn contains(&self, value: f32) -> bool {
        self.find(value).is_some()
    }
}

pub(crate) type OpenChangeCallback = Box<dyn FnMut(bool)>;
pub(crate) type SnapChangeCallback = Box<dyn FnMut(Option<f32>)>;

/// Drawer options.
///
/// `open` and `active_snap_point` are *controlled* when set: they override
/// persisted state at mount, and later external changes are applied with
/// [`Drawer::sync_open`](super::Drawer::sync_open) and
/// [`Drawer::sync_active_snap_point`](super::Drawer::sync_active_snap_point).
pub struct DrawerConfig {
    pub(crate) open: Option<bool>,
    pub(crate) default_open: bool,
    pub(crate) direction: Direction,
    pub(crate) close_on_escape: bool,
    pub(crate) snap_points: Vec<f32>,
    pub(crate) active_snap_point: Option<f32>,
    pub(crate) portal: bool,
    pub(crate) portal_container: Option<PortalContainer>,
    pub(crate) persist_state: bool,
    pub(crate) persist_key: Option<String>,
    pub(crate) persist_snap_point: bool,
    pub(crate) trap_focus: bool,
    pub(crate) tuning: DrawerTuning,
    pub(crate) on_open_change: Option<OpenChangeCallback>,
    pub(crate) on_snap_point_change: Option<SnapChangeCallback>,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            open: None,
            default_open: false,
            direction: Direction::default(),
            close_on_escape: true,
            snap_points: Vec::new(),
            active_snap_point: None,
            portal: false,
            portal_container: None,
            persist_state: false,
            persist_key: None,
            persist_snap_point: true,
            trap_focus: true,
            tuning: DrawerTuning::default(),
            on_open_change: None,
            on_snap_point_change: None,
        }
    }
}

impl fmt::Debug for DrawerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawerConfig")
            .field("open", &self.open)
            .field("default_open", &self.default_open)
            .field("direction", &self.direction)
            .field("close_on_escape", &self.close_on_escape)
            .field("snap_points", &self.snap_points)
            .field("active_snap_point", &self.active_snap_point)
            .field("portal", &self.portal)
            .field("portal_container", &self.portal_container)
            .field("persist_state", &self.persist_state)
            .field("persist_key", &self.persist_key)
            .field("persist_snap_point", &self.persist_snap_point)
            .field("trap_focus", &self.trap_focus)
            .field("tuning", &self.tuning)
            .finish_non_exhaustive()
    }
}

impl DrawerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controlled open state.
    #[must_use]
    pub fn open(mut self, open: Option<bool>) -> Self {
        self.open = open;
        self
    }

    /// Initial open state when uncontrolled and nothing is persisted.
    #[must_use]
    pub fn default_open(mut self, open: bool) -> Self {
        self.default_open = open;
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    /// Resting fractions in `(0, 1]`, strictly increasing.
    #[must_use]
    pub fn snap_points(mut self, points: impl Into<Vec<f32>>) -> Self {
        self.snap_points = points.into();
        self
    }

    /// Controlled active snap point. Must be one of the snap points.
    #[must_use]
    pub fn active_snap_point(mut self, point: Option<f32>) -> Self {
        self.active_snap_point = point;
        self
    }

    /// Render into a portal container instead of in place.
    #[must_use]
    pub fn portal(mut self, portal: bool) -> Self {
        self.portal = portal;
        self
    }

    /// Portal into a specific container. Implies `portal(true)`.
    #[must_use]
    pub fn portal_container(mut self, container: impl Into<PortalContainer>) -> Self {
        self.portal = true;
        self.portal_container = Some(container.into());
        self
    }

    /// Persist open and snap state under `key`.
    #[must_use]
    pub fn persist_state(mut self, key: impl Into<String>) -> Self {
        self.persist_state = true;
        self.persist_key = Some(key.into());
        self
    }

    /// Toggle persistence without changing the key.
    ///
    /// With persistence off, a record left under the key is cleared when the
    /// drawer unmounts.
    #[must_use]
    pub fn persist_enabled(mut self, enabled: bool) -> Self {
        self.persist_state = enabled;
        self
    }

    #[must_use]
    pub fn persist_key(mut self, key: impl Into<String>) -> Self {
        self.persist_key = Some(key.into());
        self
    }

    /// Include the active snap point in the persisted record.
    #[must_use]
    pub fn persist_snap_point(mut self, include: bool) -> Self {
        self.persist_snap_point = include;
        self
    }

    /// Confine Tab traversal to the drawer content while open.
    #[must_use]
    pub fn trap_focus(mut self, trap: bool) -> Self {
        self.trap_focus = trap;
        self
    }

    #[must_use]
    pub fn tuning(mut self, tuning: DrawerTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Called with the new value on every committed open/close.
    #[must_use]
    pub fn on_open_change(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_open_change = Some(Box::new(callback));
        self
    }

    /// Called with the new value on every committed snap point change.
    /// Closing reports `None`.
    #[must_use]
    pub fn on_snap_point_change(mut self, callback: impl FnMut(Option<f32>) + 'static) -> Self {
        self.on_snap_point_change = Some(Box::new(callback));
        self
    }

    /// Check the configuration without mounting.
    pub fn validate(&self) -> Result<SnapPoints, ConfigError> {
        let snap_points = SnapPoints::new(self.snap_points.clone())?;
        if let Some(value) = self.active_snap_point
            && !snap_points.contains(value)
        {
            return Err(ConfigError::ActiveSnapPointNotInSnapPoints { value });
        }
        if self.persist_state
            && self
                .persist_key
                .as_deref()
                .is_none_or(|key| key.trim().is_empty())
        {
            return Err(ConfigError::MissingPersistKey);
        }
        Ok(snap_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DrawerConfig::new();
        assert_eq!(config.direction, Direction::Bottom);
        assert!(config.close_on_escape);
        assert!(config.trap_focus);
        assert!(config.persist_snap_point);
        assert!(!config.portal);
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn tuning_defaults() {
        let tuning = DrawerTuning::default();
        assert_eq!(tuning.flick_velocity, 0.5);
        assert_eq!(tuning.velocity_window, Duration::from_millis(100));
        assert_eq!(tuning.settle_duration, Duration::from_millis(300));
        assert_eq!(tuning.resolver(), SnapResolver::default());
    }

    #[test]
    fn snap_points_validation() {
        assert!(SnapPoints::new(vec![0.25, 0.5, 1.0]).is_ok());
        assert_eq!(
            SnapPoints::new(vec![0.0, 0.5]),
            Err(ConfigError::SnapPointOutOfRange {
                index: 0,
                value: 0.0
            })
        );
        assert_eq!(
            SnapPoints::new(vec![0.5, 1.5]),
            Err(ConfigError::SnapPointOutOfRange {
                index: 1,
                value: 1.5
            })
        );
        assert_eq!(
            SnapPoints::new(vec![0.5, 0.5]),
            Err(ConfigError::SnapPointsNotIncreasing {
                index: 1,
                previous: 0.5,
                value: 0.5
            })
        );
        assert_eq!(
            SnapPoints::new(vec![0.2, f32::NAN]),
            Err(ConfigError::NonFiniteSnapPoint { index: 1 })
        );
    }

    #[test]
    fn snap_point_lookup() {
        let snaps = SnapPoints::new(vec![0.25, 0.5]).unwrap();
        assert_eq!(snaps.find(0.5), Some(0.5));
        assert_eq!(snaps.find(0.4), None);
        assert_eq!(snaps.first(), Some(0.25));
    }

    #[test]
    fn active_snap_point_must_be_listed() {
        let err = DrawerConfig::new()
            .snap_points([0.25f32, 0.5])
            .active_snap_point(Some(0.3))
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::ActiveSnapPointNotInSnapPoints { value: 0.3 });

        let no_snaps = DrawerConfig::new().active_snap_point(Some(0.5)).validate();
        assert!(no_snaps.is_err());
    }

    #[test]
    fn persistence_requires_key() {
        let err = DrawerConfig::new().persist_enabled(true).validate().unwrap_err();
        assert_eq!(err, ConfigError::MissingPersistKey);
        assert!(DrawerConfig::new().persist_state("  ").validate().is_err());
        assert!(DrawerConfig::new().persist_state("k").validate().is_ok());
    }

    #[test]
    fn portal_container_implies_portal() {
        let config = DrawerConfig::new().portal_container("#sheets");
        assert!(config.portal);
        assert_eq!(
            config.portal_container,
            Some(PortalContainer::Selector("#sheets".into()))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::MissingPersistKey.to_string(),
            "persist_state requires a non-empty persist key"
        );
        assert_eq!(
            ConfigError::SnapPointOutOfRange {
                index: 2,
                value: 1.5
            }
            .to_string(),
            "snap point 2 (1.5) is outside (0, 1]"
        );
    }
}
