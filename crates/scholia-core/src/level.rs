//! Level curve
//!
//! Quadratic growth: level `L` starts at `100 * (L - 1)^2` points, so the
//! thresholds run 0, 100, 400, 900, 1600, ...

use serde::{Deserialize, Serialize};

/// Points per level step before squaring
const LEVEL_SCALE: u64 = 100;

/// Level for a cumulative point total: `floor(sqrt(points / 100)) + 1`.
///
/// Integer square root keeps the boundaries exact; `floor(sqrt(floor(x)))`
/// equals `floor(sqrt(x))` for every non-negative `x`.
pub fn level_for(total_points: u64) -> u32 {
    let steps = (total_points / LEVEL_SCALE).isqrt();
    u32::try_from(steps).unwrap_or(u32::MAX - 1) + 1
}

/// First point total belonging to `level` (levels below 1 are treated as 1).
pub fn points_for_level(level: u32) -> u64 {
    let steps = u64::from(level.max(1) - 1);
    LEVEL_SCALE.saturating_mul(steps.saturating_mul(steps))
}

/// Where a point total sits inside its level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Level for the point total
    pub current_level: u32,
    /// The level after it
    pub next_level: u32,
    /// Threshold of the current level
    pub points_for_current: u64,
    /// Threshold of the next level
    pub points_for_next: u64,
    /// Percent of the way to the next level, within `[0, 100]`
    pub progress: f64,
}

impl LevelProgress {
    /// Compute progress for a point total
    pub fn for_points(total_points: u64) -> Self {
        let current_level = level_for(total_points);
        let next_level = current_level.saturating_add(1);
        let points_for_current = points_for_level(current_level);
        let points_for_next = points_for_level(next_level);

        let span = points_for_next.saturating_sub(points_for_current);
        let into = total_points.saturating_sub(points_for_current);
        let progress = if span == 0 {
            0.0
        } else {
            (into as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            current_level,
            next_level,
            points_for_current,
            points_for_next,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(399), 2);
        assert_eq!(level_for(400), 3);
        assert_eq!(level_for(900), 4);
    }

    #[test]
    fn test_level_matches_closed_form() {
        for points in (0..20_000u64).step_by(7) {
            let expected = ((points as f64 / 100.0).sqrt().floor() as u32) + 1;
            assert_eq!(level_for(points), expected, "points = {points}");
        }
    }

    #[test]
    fn test_level_is_monotonic_and_total() {
        let mut previous = level_for(0);
        for points in 0..5_000u64 {
            let level = level_for(points);
            assert!(level >= previous);
            assert!(level >= 1);
            previous = level;
        }
        assert!(level_for(u64::MAX) > 1);
    }

    #[test]
    fn test_thresholds_round_trip_through_level() {
        for level in 1..50u32 {
            assert_eq!(level_for(points_for_level(level)), level);
            assert_eq!(level_for(points_for_level(level + 1) - 1), level);
        }
    }

    #[test]
    fn test_progress_at_zero() {
        let p = LevelProgress::for_points(0);
        assert_eq!(p.current_level, 1);
        assert_eq!(p.next_level, 2);
        assert_eq!(p.points_for_next, 100);
        assert_eq!(p.progress, 0.0);
    }

    #[test]
    fn test_progress_mid_level() {
        // level 2 spans 100..400
        let p = LevelProgress::for_points(250);
        assert_eq!(p.current_level, 2);
        assert_eq!(p.points_for_current, 100);
        assert_eq!(p.points_for_next, 400);
        assert!((p.progress - 50.0).abs() < f64::EPSILON);
    }
}
