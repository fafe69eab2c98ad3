//! # Deadline timers
//!
//! A [`Deadline`] expires a fixed period after it was last reset. Time is passed in explicitly as
//! monotonic seconds, so the timer holds no hidden counting state and can be driven from tests.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deadline {
    /// Time between a reset and the expiry
    period_s: f64,

    /// Time at which the deadline expires
    deadline_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Deadline {
    /// Create a new deadline, armed from time zero.
    pub fn new(period_s: f64) -> Self {
        Self {
            period_s,
            deadline_s: period_s,
        }
    }

    /// Re-arm the deadline from `now_s`.
    pub fn reset(&mut self, now_s: f64) {
        self.deadline_s = now_s + self.period_s;
    }

    /// Change the period and re-arm the deadline from `now_s`.
    pub fn set_period(&mut self, period_s: f64, now_s: f64) {
        self.period_s = period_s;
        self.reset(now_s);
    }

    /// True once the period has fully elapsed since the last reset.
    pub fn overflow(&self, now_s: f64) -> bool {
        now_s >= self.deadline_s
    }

    /// Time left before the deadline, zero once it has overflowed.
    pub fn remaining(&self, now_s: f64) -> f64 {
        (self.deadline_s - now_s).max(0.0)
    }

    pub fn period(&self) -> f64 {
        self.period_s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_overflow() {
        let mut d = Deadline::new(60.0);
        d.reset(10.0);

        assert!(!d.overflow(69.9));
        assert!(d.overflow(70.0));
        assert_eq!(d.remaining(40.0), 30.0);
        assert_eq!(d.remaining(100.0), 0.0);

        d.reset(70.0);
        assert!(!d.overflow(70.0));
    }

    #[test]
    fn test_set_period_rearms() {
        let mut d = Deadline::new(60.0);
        d.reset(0.0);

        d.set_period(5.0, 100.0);
        assert_eq!(d.period(), 5.0);
        assert!(!d.overflow(104.0));
        assert!(d.overflow(105.0));
    }
}
