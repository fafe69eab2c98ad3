//! # Mission plan messages
//!
//! Messages used to store a plan in the vehicle's plan database and to start its execution.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::bus::{FollowSystem, SpeedUnits, SystemId, ZUnits};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Go to a single waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goto {
    pub lat_rad: f64,

    pub lon_rad: f64,

    #[serde(default)]
    pub z_m: f64,

    #[serde(default)]
    pub z_units: ZUnits,

    pub speed: f64,

    #[serde(default)]
    pub speed_units: SpeedUnits,
}

/// A maneuver within a plan, identified by its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanManeuver {
    pub maneuver_id: String,

    pub data: Maneuver,
}

/// Transition between two maneuvers of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTransition {
    pub source_man: String,

    pub dest_man: String,

    /// Condition which triggers the transition, e.g. `ManeuverIsDone`
    pub conditions: String,
}

/// A complete plan: the maneuvers, the transitions between them and where to start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSpecification {
    pub plan_id: String,

    pub start_man_id: String,

    pub maneuvers: Vec<PlanManeuver>,

    pub transitions: Vec<PlanTransition>,
}

/// Plan database request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDb {
    pub op: PlanDbOp,

    #[serde(rename = "type")]
    pub db_type: PlanDbType,

    pub request_id: u16,

    pub plan_id: String,

    pub arg: Option<PlanSpecification>,

    /// The system which shall store the plan, `None` for the local system
    pub destination: Option<SystemId>,
}

/// Plan execution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanControl {
    #[serde(rename = "type")]
    pub ctrl_type: PlanControlType,

    pub op: PlanControlOp,

    pub plan_id: String,

    /// Keep executing the plan even if non-critical errors are reported
    pub ignore_errors: bool,

    pub destination: Option<SystemId>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Maneuvers which can be placed in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Maneuver {
    Goto(Goto),
    FollowSystem(FollowSystem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanDbOp {
    Set,
    Del,
    Get,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanDbType {
    Request,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanControlOp {
    Start,
    Stop,
    Load,
    Get,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanControlType {
    Request,
    Success,
    Failure,
}
