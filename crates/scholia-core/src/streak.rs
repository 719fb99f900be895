//! Daily activity streaks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Streak state as stored on the stats aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streak {
    /// Consecutive days with activity, ending at `last_active`
    pub current: u32,
    /// Longest run ever observed
    pub longest: u32,
    /// Day of the last qualifying activity
    pub last_active: Option<NaiveDate>,
}

impl Streak {
    /// State after an activity on `day`.
    ///
    /// Same day: unchanged. Next day: +1. Any longer gap: back to 1. A day
    /// before `last_active` (clock skew) never rewinds the streak.
    #[must_use]
    pub fn record_activity(self, day: NaiveDate) -> Streak {
        let current = match self.last_active {
            None => 1,
            Some(last) if day <= last => return self,
            Some(last) if last.succ_opt() == Some(day) => self.current.saturating_add(1),
            Some(_) => 1,
        };

        Streak {
            current,
            longest: self.longest.max(current),
            last_active: Some(day),
        }
    }

    /// True when the streak lapses unless there is activity on `today`.
    pub fn is_at_risk(&self, today: NaiveDate) -> bool {
        self.current > 0 && self.last_active.is_some_and(|last| last.succ_opt() == Some(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let s = Streak::default().record_activity(day(1));
        assert_eq!(s.current, 1);
        assert_eq!(s.longest, 1);
        assert_eq!(s.last_active, Some(day(1)));
    }

    #[test]
    fn test_next_day_increments() {
        let s = Streak::default()
            .record_activity(day(1))
            .record_activity(day(2))
            .record_activity(day(3));
        assert_eq!(s.current, 3);
        assert_eq!(s.longest, 3);
    }

    #[test]
    fn test_same_day_is_unchanged() {
        let s = Streak::default().record_activity(day(1)).record_activity(day(2));
        let again = s.record_activity(day(2));
        assert_eq!(again, s);
    }

    #[test]
    fn test_gap_resets_to_one_but_keeps_longest() {
        let s = Streak::default()
            .record_activity(day(1))
            .record_activity(day(2))
            .record_activity(day(4));
        assert_eq!(s.current, 1);
        assert_eq!(s.longest, 2);
        assert_eq!(s.last_active, Some(day(4)));
    }

    #[test]
    fn test_earlier_day_does_not_rewind() {
        let s = Streak::default().record_activity(day(5));
        assert_eq!(s.record_activity(day(3)), s);
    }

    #[test]
    fn test_month_boundary_counts_as_consecutive() {
        let end_of_april = NaiveDate::from_ymd_opt(2026, 4, 30).unwrap();
        let s = Streak::default()
            .record_activity(end_of_april)
            .record_activity(day(1));
        assert_eq!(s.current, 2);
    }

    #[test]
    fn test_at_risk_only_when_last_activity_was_yesterday() {
        let s = Streak::default().record_activity(day(1));
        assert!(s.is_at_risk(day(2)));
        assert!(!s.is_at_risk(day(1)));
        assert!(!s.is_at_risk(day(3)));
        assert!(!Streak::default().is_at_risk(day(2)));
    }
}
