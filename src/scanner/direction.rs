//! Cardinal travel directions with tolerance matching.

use serde::{Deserialize, Serialize};

/// A cardinal compass direction.
///
/// Bearings are matched against cardinals with a ±45° tolerance, so the four
/// variants partition the compass rose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Half-width of the matching window around each cardinal, degrees.
    pub const TOLERANCE_DEG: f64 = 45.0;

    const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The cardinal's bearing in degrees.
    pub fn degrees(self) -> f64 {
        match self {
            Direction::North => 0.0,
            Direction::East => 90.0,
            Direction::South => 180.0,
            Direction::West => 270.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// The cardinal whose matching window contains the given bearing.
    ///
    /// Every finite bearing maps to exactly one cardinal (boundary bearings
    /// such as 45° resolve to the first match in N, E, S, W order).
    pub fn from_degrees(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|direction| direction.matches(degrees))
    }

    /// Whether a course in degrees falls within the tolerance window of this
    /// cardinal, wrapping across 0°/360°.
    pub fn matches(self, course: f64) -> bool {
        if !course.is_finite() {
            return false;
        }
        let diff = (course.rem_euclid(360.0) - self.degrees()).abs();
        diff <= Self::TOLERANCE_DEG || diff >= 360.0 - Self::TOLERANCE_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_with_wraparound() {
        assert!(Direction::North.matches(0.0));
        assert!(Direction::North.matches(44.0));
        assert!(Direction::North.matches(350.0));
        assert!(!Direction::North.matches(90.1));
        assert!(Direction::South.matches(180.0));
        assert!(!Direction::South.matches(10.0));
    }

    #[test]
    fn from_degrees_covers_full_circle() {
        assert_eq!(Direction::from_degrees(10.0), Some(Direction::North));
        assert_eq!(Direction::from_degrees(350.0), Some(Direction::North));
        assert_eq!(Direction::from_degrees(100.0), Some(Direction::East));
        assert_eq!(Direction::from_degrees(200.0), Some(Direction::South));
        assert_eq!(Direction::from_degrees(280.0), Some(Direction::West));
        assert_eq!(Direction::from_degrees(f64::NAN), None);
    }

    #[test]
    fn opposites() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
    }
}
