use crate::domain::model::Snapshot;
use serde::Serialize;

/// Percentage change from `previous` to `current`.
///
/// A zero baseline reads as +100% when anything happened and 0% otherwise.
pub fn percent_change(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    (current as f64 - previous as f64) / previous as f64 * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub current: u64,
    pub previous: u64,
    pub percent: f64,
}

impl Delta {
    pub fn new(current: u64, previous: u64) -> Self {
        Self {
            current,
            previous,
            percent: percent_change(current, previous),
        }
    }

    pub fn is_increase(&self) -> bool {
        self.percent >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayOverDay {
    pub messages: Delta,
    pub users: Delta,
}

impl DayOverDay {
    pub fn between(current: &Snapshot, baseline: &Snapshot) -> Self {
        Self {
            messages: Delta::new(current.total_messages(), baseline.total_messages()),
            users: Delta::new(current.active_users(), baseline.active_users()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(150, 100), 50.0);
        assert_eq!(percent_change(50, 100), -50.0);
        assert_eq!(percent_change(100, 100), 0.0);
    }

    #[test]
    fn test_percent_change_zero_baseline() {
        assert_eq!(percent_change(7, 0), 100.0);
        assert_eq!(percent_change(0, 0), 0.0);
    }

    #[test]
    fn test_delta_direction() {
        assert!(Delta::new(3, 3).is_increase());
        assert!(!Delta::new(2, 3).is_increase());
    }
}
