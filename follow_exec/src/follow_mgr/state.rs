//! # Follow maneuver states
//!
//! The maneuver's state machine, expressed as a pure transition function over [`FollowState`] and
//! [`FollowEvent`]. The [`super::FollowMgr`] works out which event occurred and applies it here.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// State of the follow maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FollowState {
    /// No maneuver bound
    Idle,

    /// Bound, waiting for the first leader report, movement disabled
    Armed,

    /// Issuing path commands
    Tracking,

    /// Movement disabled until a leader report passes all checks
    Holding(HoldCause),

    /// The maneuver's duration has elapsed
    Completed,

    /// Leader reports have stopped arriving, movement disabled
    TimedOut,
}

/// Why movement was disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HoldCause {
    /// Too close to the leader's standoff point
    Unsafe,

    /// The collision arbiter said to yield to the other follower
    Collision,

    /// The path follower reported being near the end of the path
    NearEnd,
}

/// Events driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowEvent {
    /// A maneuver was bound
    Activate,

    /// The maneuver was unbound
    Deactivate,

    /// A leader report passed every check and a path was dispatched
    Cleared,

    /// A leader report failed a check
    Blocked(HoldCause),

    /// Movement must stop, but only matters if currently moving
    Disable(HoldCause),

    /// The leader staleness deadline overflowed
    Stale,

    /// The maneuver's duration elapsed
    Elapsed,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FollowState {
    /// Get the state following `self` when `event` occurs.
    pub fn next(self, event: FollowEvent) -> FollowState {
        use FollowEvent::*;
        use FollowState::*;

        match (self, event) {
            (_, Activate) => Armed,
            (_, Deactivate) => Idle,

            // Nothing but activation leaves these
            (Idle, _) | (Completed, _) => self,

            (_, Cleared) => Tracking,
            (_, Blocked(cause)) => Holding(cause),

            (Tracking, Disable(cause)) => Holding(cause),
            (_, Disable(_)) => self,

            (_, Stale) => TimedOut,

            (_, Elapsed) => Completed,
        }
    }

    /// True if the maneuver is bound and still running.
    pub fn is_running(&self) -> bool {
        !matches!(self, FollowState::Idle | FollowState::Completed)
    }

    /// True if the maneuver will not progress without a new bus message, either because it is
    /// over or because the leader has gone quiet.
    pub fn is_settled(&self) -> bool {
        !self.is_running() || matches!(self, FollowState::TimedOut)
    }

    /// True if path commands are being issued.
    pub fn is_moving(&self) -> bool {
        matches!(self, FollowState::Tracking)
    }
}

impl Default for FollowState {
    fn default() -> Self {
        FollowState::Idle
    }
}

impl Display for FollowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FollowState::Idle => write!(f, "FollowState::Idle"),
            FollowState::Armed => write!(f, "FollowState::Armed"),
            FollowState::Tracking => write!(f, "FollowState::Tracking"),
            FollowState::Holding(c) => write!(f, "FollowState::Holding({:?})", c),
            FollowState::Completed => write!(f, "FollowState::Completed"),
            FollowState::TimedOut => write!(f, "FollowState::TimedOut"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use FollowEvent::*;
    use FollowState::*;

    const ALL_STATES: [FollowState; 8] = [
        Idle,
        Armed,
        Tracking,
        Holding(HoldCause::Unsafe),
        Holding(HoldCause::Collision),
        Holding(HoldCause::NearEnd),
        Completed,
        TimedOut,
    ];

    #[test]
    fn test_activate_and_deactivate_from_anywhere() {
        for s in ALL_STATES.iter() {
            assert_eq!(s.next(Activate), Armed);
            assert_eq!(s.next(Deactivate), Idle);
        }
    }

    #[test]
    fn test_idle_and_completed_are_inert() {
        let events = [
            Cleared,
            Blocked(HoldCause::Unsafe),
            Disable(HoldCause::NearEnd),
            Stale,
            Elapsed,
        ];

        for e in events.iter() {
            assert_eq!(Idle.next(*e), Idle);
            assert_eq!(Completed.next(*e), Completed);
        }
    }

    #[test]
    fn test_reports() {
        assert_eq!(Armed.next(Cleared), Tracking);
        assert_eq!(Holding(HoldCause::Unsafe).next(Cleared), Tracking);
        assert_eq!(TimedOut.next(Cleared), Tracking);

        assert_eq!(
            Tracking.next(Blocked(HoldCause::Collision)),
            Holding(HoldCause::Collision)
        );
        assert_eq!(
            Armed.next(Blocked(HoldCause::Unsafe)),
            Holding(HoldCause::Unsafe)
        );
        assert_eq!(
            TimedOut.next(Blocked(HoldCause::Unsafe)),
            Holding(HoldCause::Unsafe)
        );
    }

    #[test]
    fn test_disable_only_stops_tracking() {
        assert_eq!(
            Tracking.next(Disable(HoldCause::NearEnd)),
            Holding(HoldCause::NearEnd)
        );
        assert_eq!(Armed.next(Disable(HoldCause::NearEnd)), Armed);
        assert_eq!(TimedOut.next(Disable(HoldCause::Unsafe)), TimedOut);
        assert_eq!(
            Holding(HoldCause::Collision).next(Disable(HoldCause::Unsafe)),
            Holding(HoldCause::Collision)
        );
    }

    #[test]
    fn test_stale_and_elapsed() {
        assert_eq!(Armed.next(Stale), TimedOut);
        assert_eq!(Tracking.next(Stale), TimedOut);
        assert_eq!(TimedOut.next(Stale), TimedOut);
        assert_eq!(Tracking.next(Elapsed), Completed);
        assert_eq!(TimedOut.next(Elapsed), Completed);
    }

    #[test]
    fn test_predicates() {
        assert!(!Idle.is_running());
        assert!(!Completed.is_running());
        assert!(TimedOut.is_running());
        assert!(Tracking.is_moving());
        assert!(Idle.is_settled());
        assert!(Completed.is_settled());
        assert!(TimedOut.is_settled());
        assert!(!Armed.is_settled());
        assert!(!Holding(HoldCause::NearEnd).is_settled());
        assert!(!Holding(HoldCause::Unsafe).is_moving());
    }
}
