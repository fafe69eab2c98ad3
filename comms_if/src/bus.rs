//! # Bus messages
//!
//! Messages consumed and produced by the follow maneuver. All angles are in radians and all
//! distances in meters unless the field name says otherwise.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Identifier of a system (vehicle) on the bus.
pub type SystemId = u16;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Broadcast position announcement (beacon) from any vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Announce {
    /// System which sent the announcement
    pub source: SystemId,

    /// Latitude (WGS-84)
    pub lat_rad: f64,

    /// Longitude (WGS-84)
    pub lon_rad: f64,

    /// Height above the WGS-84 ellipsoid
    #[serde(default)]
    pub height_m: f64,

    /// Time at which the announcement was produced
    #[serde(default)]
    pub timestamp_s: f64,
}

/// Point-to-point position and heading feed from a remote vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteState {
    pub source: SystemId,

    pub lat_rad: f64,

    pub lon_rad: f64,

    /// Depth of the vehicle, positive down
    #[serde(default)]
    pub depth_m: f64,

    /// Heading of the vehicle, clockwise from north
    pub psi_rad: f64,

    #[serde(default)]
    pub timestamp_s: f64,
}

/// Navigation estimate of a vehicle.
///
/// The position is given as a geodetic reference point plus a displacement in the local
/// north-east-down frame centred on that reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatedState {
    pub source: SystemId,

    /// Latitude of the reference point
    pub lat_rad: f64,

    /// Longitude of the reference point
    pub lon_rad: f64,

    /// North offset from the reference point
    #[serde(default)]
    pub x_m: f64,

    /// East offset from the reference point
    #[serde(default)]
    pub y_m: f64,

    /// Down offset from the reference point
    #[serde(default)]
    pub z_m: f64,
}

/// Status notification from the path-following subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathControlState {
    /// The vehicle is near the end of the current path
    pub near: bool,
}

/// Activation payload of the follow maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowSystem {
    /// The system to follow (the leader)
    pub system: SystemId,

    /// Maneuver duration, zero means unbounded
    #[serde(default)]
    pub duration_s: u16,

    /// Nominal speed, used until the speed regulator has a valid error history
    pub speed: f64,

    #[serde(default)]
    pub speed_units: SpeedUnits,

    /// Forward offset from the leader, in the leader's frame
    #[serde(default)]
    pub x_m: f64,

    /// Lateral offset from the leader, in the leader's frame
    #[serde(default)]
    pub y_m: f64,

    /// Vertical offset added to the leader's depth
    #[serde(default)]
    pub z_m: f64,

    #[serde(default)]
    pub z_units: ZUnits,

    /// Loiter radius, overriding the configured one when set
    #[serde(default)]
    pub loiter_radius_m: Option<f64>,
}

/// Path command produced by the follow maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesiredPath {
    pub end_lat_rad: f64,

    pub end_lon_rad: f64,

    pub end_z_m: f64,

    pub end_z_units: ZUnits,

    /// Loiter radius at the end point, negative for no loiter
    pub lradius_m: f64,

    pub speed: f64,

    pub speed_units: SpeedUnits,

    /// Go directly to the end point, ignoring the start point
    pub direct: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Units of a speed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedUnits {
    MetersPs,
    Rpm,
    Percentage,
}

/// Units of a vertical reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZUnits {
    None,
    Depth,
    Altitude,
    Height,
}

/// Advisory signal sent to the mission supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MnvrSignal {
    /// The maneuver is running and is expected to end in `time_left_s`
    Progress { time_left_s: f64, fraction: f64 },

    /// The maneuver has finished
    Completed,

    /// A recoverable error, the maneuver keeps running
    Error(String),
}

/// A single message on the bus, as read from a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BusMsg {
    Announce(Announce),
    RemoteState(RemoteState),
    EstimatedState(EstimatedState),
    PathControlState(PathControlState),
    FollowSystem(FollowSystem),
    StopManeuver,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum BusParseError {
    #[error("Message contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SpeedUnits {
    fn default() -> Self {
        SpeedUnits::MetersPs
    }
}

impl Default for ZUnits {
    fn default() -> Self {
        ZUnits::Depth
    }
}

impl BusMsg {
    /// Parse a message from its JSON representation.
    pub fn from_json(json_str: &str) -> Result<Self, BusParseError> {
        serde_json::from_str(json_str).map_err(BusParseError::InvalidJson)
    }

    /// The system which sent the message, if the message carries one.
    pub fn source(&self) -> Option<SystemId> {
        match self {
            BusMsg::Announce(m) => Some(m.source),
            BusMsg::RemoteState(m) => Some(m.source),
            BusMsg::EstimatedState(m) => Some(m.source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_announce() {
        let msg = BusMsg::from_json(
            r#"{"type": "Announce", "payload": {"source": 10, "lat_rad": 0.71, "lon_rad": -0.14}}"#,
        )
        .unwrap();

        match msg {
            BusMsg::Announce(a) => {
                assert_eq!(a.source, 10);
                assert_eq!(a.height_m, 0.0);
            }
            _ => panic!("Expected an announce, found {:?}", msg),
        }
        assert_eq!(msg.source(), Some(10));
    }

    #[test]
    fn test_parse_follow_system_defaults() {
        let msg = BusMsg::from_json(
            r#"{"type": "FollowSystem", "payload": {"system": 3, "speed": 1.5, "x_m": -10.0}}"#,
        )
        .unwrap();

        match msg {
            BusMsg::FollowSystem(f) => {
                assert_eq!(f.duration_s, 0);
                assert_eq!(f.speed_units, SpeedUnits::MetersPs);
                assert_eq!(f.z_units, ZUnits::Depth);
                assert_eq!(f.loiter_radius_m, None);
            }
            _ => panic!("Expected a follow system, found {:?}", msg),
        }
    }

    #[test]
    fn test_parse_stop_and_garbage() {
        assert_eq!(
            BusMsg::from_json(r#"{"type": "StopManeuver"}"#).unwrap(),
            BusMsg::StopManeuver
        );
        assert!(BusMsg::from_json(r#"{"type": "Launch"}"#).is_err());
    }
}
