//! # FollowMgr Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bus::SystemId;
use serde::Deserialize;

use crate::speed_ctrl;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the follow maneuver, loaded from `follow.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowParams {
    /// Bus id of this vehicle
    pub own_id: SystemId,

    /// Ids of the other followers sharing the leader
    #[serde(default)]
    pub peer_ids: Vec<SystemId>,

    /// Loiter radius put in every path command, negative for none
    #[serde(default = "default_loiter_radius_m")]
    pub loiter_radius_m: f64,

    /// Time without a leader report after which the leader is considered stale
    #[serde(default = "default_timeout_s")]
    pub timeout_s: f64,

    /// Track the leader with its beacons
    #[serde(default)]
    pub use_announce: bool,

    /// Track the leader with its remote state reports
    #[serde(default)]
    pub use_remote_state: bool,

    /// Minimum displacement of the leader for its bearing to be recomputed
    #[serde(default = "default_min_displace_m")]
    pub min_displace_m: f64,

    /// How long a remote state heading takes priority over the bearing computed from beacons
    #[serde(default = "default_heading_cooldown_s")]
    pub heading_cooldown_s: f64,

    /// Minimum safe separation between vehicles
    #[serde(default = "default_safe_distance_m")]
    pub safe_distance_m: f64,

    /// Enable the follower-follower check and the collision arbiter
    #[serde(default = "default_true")]
    pub anti_collision: bool,

    /// Target distance between this vehicle and its standoff point
    #[serde(default = "default_desired_distance_m")]
    pub desired_distance_m: f64,

    /// Period at which the executable runs the state report
    #[serde(default = "default_state_report_period_s")]
    pub state_report_period_s: f64,

    #[serde(default)]
    pub speed_ctrl: speed_ctrl::Params,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("The leader timeout must be positive, got {0} s")]
    InvalidTimeout(f64),

    #[error("Parameter {0} must not be negative, got {1}")]
    Negative(&'static str, f64),

    #[error("Speed output limits are inverted: min {0} > max {1}")]
    InvertedOutputLimits(f64, f64),

    #[error("The distance error scale must be positive, got {0}")]
    InvalidErrorScale(f64),

    #[error("Both the beacon and the remote state tracking channels are disabled")]
    NoTrackingChannel,

    #[error("The own id {0} is listed as a peer")]
    OwnIdIsPeer(SystemId),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FollowParams {
    /// Check the parameters are consistent.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.timeout_s > 0.0) {
            return Err(ParamsError::InvalidTimeout(self.timeout_s));
        }

        let non_negative = [
            ("min_displace_m", self.min_displace_m),
            ("heading_cooldown_s", self.heading_cooldown_s),
            ("safe_distance_m", self.safe_distance_m),
            ("speed_ctrl.integral_limit", self.speed_ctrl.integral_limit),
        ];
        for (name, value) in non_negative.iter() {
            if *value < 0.0 {
                return Err(ParamsError::Negative(*name, *value));
            }
        }

        if self.speed_ctrl.output_min > self.speed_ctrl.output_max {
            return Err(ParamsError::InvertedOutputLimits(
                self.speed_ctrl.output_min,
                self.speed_ctrl.output_max,
            ));
        }

        if !(self.speed_ctrl.error_scale > 0.0) {
            return Err(ParamsError::InvalidErrorScale(self.speed_ctrl.error_scale));
        }

        if !self.use_announce && !self.use_remote_state {
            return Err(ParamsError::NoTrackingChannel);
        }

        if self.peer_ids.contains(&self.own_id) {
            return Err(ParamsError::OwnIdIsPeer(self.own_id));
        }

        Ok(())
    }

    /// Parameters with the default values and the given own id, tracking with beacons.
    pub fn with_own_id(own_id: SystemId) -> Self {
        Self {
            own_id,
            peer_ids: Vec::new(),
            loiter_radius_m: default_loiter_radius_m(),
            timeout_s: default_timeout_s(),
            use_announce: true,
            use_remote_state: false,
            min_displace_m: default_min_displace_m(),
            heading_cooldown_s: default_heading_cooldown_s(),
            safe_distance_m: default_safe_distance_m(),
            anti_collision: true,
            desired_distance_m: default_desired_distance_m(),
            state_report_period_s: default_state_report_period_s(),
            speed_ctrl: speed_ctrl::Params::default(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_loiter_radius_m() -> f64 {
    -1.0
}

fn default_timeout_s() -> f64 {
    60.0
}

fn default_min_displace_m() -> f64 {
    2.0
}

fn default_heading_cooldown_s() -> f64 {
    15.0
}

fn default_safe_distance_m() -> f64 {
    15.0
}

fn default_desired_distance_m() -> f64 {
    20.0
}

fn default_state_report_period_s() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let params: FollowParams = util::params::from_str(
            r#"
            own_id = 22
            use_announce = true
            "#,
        )
        .unwrap();

        assert_eq!(params.own_id, 22);
        assert!(params.peer_ids.is_empty());
        assert_eq!(params.loiter_radius_m, -1.0);
        assert_eq!(params.timeout_s, 60.0);
        assert!(!params.use_remote_state);
        assert!(params.anti_collision);
        assert_eq!(params.speed_ctrl, speed_ctrl::Params::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_load_speed_ctrl_table() {
        let params: FollowParams = util::params::from_str(
            r#"
            own_id = 22
            peer_ids = [23]
            use_remote_state = true

            [speed_ctrl]
            k_p = 0.5
            output_max = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(params.peer_ids, vec![23]);
        assert_eq!(params.speed_ctrl.k_p, 0.5);
        assert_eq!(params.speed_ctrl.output_max, 2.0);
        assert_eq!(params.speed_ctrl.k_i, 0.068);
    }

    #[test]
    fn test_validate() {
        let good = FollowParams::with_own_id(1);
        assert!(good.validate().is_ok());

        let mut p = good.clone();
        p.timeout_s = 0.0;
        assert_eq!(p.validate(), Err(ParamsError::InvalidTimeout(0.0)));

        let mut p = good.clone();
        p.safe_distance_m = -1.0;
        assert_eq!(
            p.validate(),
            Err(ParamsError::Negative("safe_distance_m", -1.0))
        );

        let mut p = good.clone();
        p.speed_ctrl.output_min = 5.0;
        assert_eq!(
            p.validate(),
            Err(ParamsError::InvertedOutputLimits(5.0, 4.0))
        );

        let mut p = good.clone();
        p.use_announce = false;
        assert_eq!(p.validate(), Err(ParamsError::NoTrackingChannel));

        let mut p = good.clone();
        p.peer_ids = vec![1];
        assert_eq!(p.validate(), Err(ParamsError::OwnIdIsPeer(1)));
    }
}
