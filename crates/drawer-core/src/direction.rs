#![forbid(unsafe_code)]

//! Drawer direction and drag-axis projection.
//!
//! A drawer is attached to one viewport edge. The edge fixes the drag axis and
//! the sign convention: moving the pointer *toward* the attached edge closes
//! the drawer.
//!
//! | Direction | Axis | Closing motion |
//! |-----------|------|----------------|
//! | `Bottom` | vertical | down (`+y`) |
//! | `Top` | vertical | up (`-y`) |
//! | `Right` | horizontal | right (`+x`) |
//! | `Left` | horizontal | left (`-x`) |
//!
//! # Invariants
//!
//! 1. [`Direction::project`] returns a positive distance for closing motion and
//!    a negative distance for opening motion, for every direction.
//! 2. Motion perpendicular to the axis projects to exactly `0.0`.

use core::fmt;
use core::str::FromStr;

use crate::geometry::Point;

/// Drag axis of a drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Viewport edge a drawer slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Bottom,
    Top,
    Left,
    Right,
}

impl Direction {
    /// All directions, in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Bottom,
        Direction::Top,
        Direction::Left,
        Direction::Right,
    ];

    /// The axis the drawer is dragged along.
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Bottom | Self::Top => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// Sign of the closing motion along [`axis`](Self::axis) in viewport
    /// coordinates.
    #[inline]
    pub const fn closing_sign(self) -> f32 {
        match self {
            Self::Bottom | Self::Right => 1.0,
            Self::Top | Self::Left => -1.0,
        }
    }

    /// Project a pointer delta onto the drag axis.
    ///
    /// Positive results move the drawer toward closed.
    #[inline]
    pub fn project(self, delta: Point) -> f32 {
        let along = match self.axis() {
            Axis::Vertical => delta.y,
            Axis::Horizontal => delta.x,
        };
        along * self.closing_sign()
    }

    /// Viewport translation for a drawer pushed `distance` pixels toward its
    /// closed position.
    #[inline]
    pub fn translation(self, distance: f32) -> Point {
        let signed = distance * self.closing_sign();
        match self.axis() {
            Axis::Vertical => Point::new(0.0, signed),
            Axis::Horizontal => Point::new(signed, 0.0),
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown direction name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError {
    input: String,
}

impl ParseDirectionError {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown drawer direction '{}' (expected bottom, top, left or right)",
            self.input
        )
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom" => Ok(Self::Bottom),
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(ParseDirectionError {
                input: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_bottom() {
        assert_eq!(Direction::default(), Direction::Bottom);
    }

    #[test]
    fn axis_per_direction() {
        assert_eq!(Direction::Bottom.axis(), Axis::Vertical);
        assert_eq!(Direction::Top.axis(), Axis::Vertical);
        assert_eq!(Direction::Left.axis(), Axis::Horizontal);
        assert_eq!(Direction::Right.axis(), Axis::Horizontal);
    }

    #[test]
    fn drag_toward_edge_is_closing() {
        assert_eq!(Direction::Bottom.project(Point::new(0.0, 30.0)), 30.0);
        assert_eq!(Direction::Top.project(Point::new(0.0, -30.0)), 30.0);
        assert_eq!(Direction::Right.project(Point::new(30.0, 0.0)), 30.0);
        assert_eq!(Direction::Left.project(Point::new(-30.0, 0.0)), 30.0);
    }

    #[test]
    fn drag_away_from_edge_is_opening() {
        assert_eq!(Direction::Bottom.project(Point::new(0.0, -12.0)), -12.0);
        assert_eq!(Direction::Left.project(Point::new(12.0, 0.0)), -12.0);
    }

    #[test]
    fn translation_points_toward_edge() {
        assert_eq!(Direction::Bottom.translation(10.0), Point::new(0.0, 10.0));
        assert_eq!(Direction::Top.translation(10.0), Point::new(0.0, -10.0));
        assert_eq!(Direction::Left.translation(10.0), Point::new(-10.0, 0.0));
        assert_eq!(Direction::Right.translation(10.0), Point::new(10.0, 0.0));
    }

    #[test]
    fn parse_round_trips_display() {
        for direction in Direction::ALL {
            assert_eq!(direction.to_string().parse::<Direction>(), Ok(direction));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" Right ".parse::<Direction>(), Ok(Direction::Right));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "diagonal".parse::<Direction>().unwrap_err();
        assert_eq!(err.input(), "diagonal");
        assert!(err.to_string().contains("diagonal"));
    }

    proptest! {
        #[test]
        fn perpendicular_motion_is_ignored(d in -500.0f32..500.0) {
            prop_assert_eq!(Direction::Bottom.project(Point::new(d, 0.0)), 0.0);
            prop_assert_eq!(Direction::Right.project(Point::new(0.0, d)), 0.0);
        }

        #[test]
        fn translation_projects_back(d in -500.0f32..500.0) {
            for direction in Direction::ALL {
                let projected = direction.project(direction.translation(d));
                prop_assert!((projected - d).abs() < 1e-3);
            }
        }
    }
}
