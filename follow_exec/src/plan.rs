//! # Plan builder
//!
//! Assembles sequential mission plans from a list of maneuvers, and builds the requests which store
//! a plan in a vehicle's plan database and start it. This is how a leader is sent along a route for
//! the followers to track.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    bus::{SpeedUnits, SystemId, ZUnits},
    plan::{
        Goto, Maneuver, PlanControl, PlanControlOp, PlanControlType, PlanDb, PlanDbOp, PlanDbType,
        PlanManeuver, PlanSpecification, PlanTransition,
    },
};
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Condition used on every transition of a sequential plan
pub const MANEUVER_IS_DONE: &str = "ManeuverIsDone";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A route given as waypoints in degrees, as loaded from a route file.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub plan_id: String,

    /// Speed at which each waypoint is approached
    pub speed: f64,

    /// System which shall execute the plan
    #[serde(default)]
    pub destination: Option<SystemId>,

    /// `[latitude, longitude]` pairs in degrees
    pub waypoints_deg: Vec<[f64; 2]>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlanError {
    #[error("A plan needs at least one maneuver")]
    NoManeuvers,

    #[error("Waypoint {0} is not a valid position: ({1}, {2}) deg")]
    InvalidWaypoint(usize, f64, f64),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a plan executing the given maneuvers one after the other.
///
/// Maneuvers are numbered from `"1"`, each transitioning to the next once it's done.
pub fn sequential_plan(
    plan_id: &str,
    maneuvers: Vec<Maneuver>,
) -> Result<PlanSpecification, PlanError> {
    if maneuvers.is_empty() {
        return Err(PlanError::NoManeuvers);
    }

    let mut spec = PlanSpecification {
        plan_id: String::from(plan_id),
        start_man_id: String::from("1"),
        ..Default::default()
    };

    for (i, data) in maneuvers.into_iter().enumerate() {
        let maneuver_id = (i + 1).to_string();

        if let Some(prev) = spec.maneuvers.last() {
            spec.transitions.push(PlanTransition {
                source_man: prev.maneuver_id.clone(),
                dest_man: maneuver_id.clone(),
                conditions: String::from(MANEUVER_IS_DONE),
            });
        }

        spec.maneuvers.push(PlanManeuver { maneuver_id, data });
    }

    Ok(spec)
}

/// Build a plan database request storing a plan of `Goto`s through the given waypoints.
///
/// Waypoints are `(latitude, longitude)` pairs in degrees.
pub fn plan_db_entry(
    waypoints_deg: &[(f64, f64)],
    plan_id: &str,
    speed: f64,
) -> Result<PlanDb, PlanError> {
    let mut maneuvers = Vec::with_capacity(waypoints_deg.len());

    for (i, &(lat_deg, lon_deg)) in waypoints_deg.iter().enumerate() {
        if !lat_deg.is_finite() || !lon_deg.is_finite() || lat_deg.abs() > 90.0 {
            return Err(PlanError::InvalidWaypoint(i, lat_deg, lon_deg));
        }

        maneuvers.push(Maneuver::Goto(Goto {
            lat_rad: lat_deg.to_radians(),
            lon_rad: lon_deg.to_radians(),
            z_m: 0.0,
            z_units: ZUnits::Depth,
            speed,
            speed_units: SpeedUnits::MetersPs,
        }));
    }

    let spec = sequential_plan(plan_id, maneuvers)?;

    Ok(PlanDb {
        op: PlanDbOp::Set,
        db_type: PlanDbType::Request,
        request_id: 0,
        plan_id: spec.plan_id.clone(),
        arg: Some(spec),
        destination: None,
    })
}

/// Build a request starting the given plan, ignoring non-critical errors.
pub fn start_request(plan_id: &str, destination: Option<SystemId>) -> PlanControl {
    PlanControl {
        ctrl_type: PlanControlType::Request,
        op: PlanControlOp::Start,
        plan_id: String::from(plan_id),
        ignore_errors: true,
        destination,
    }
}

impl Route {
    /// The waypoints as `(latitude, longitude)` pairs.
    pub fn waypoints(&self) -> Vec<(f64, f64)> {
        self.waypoints_deg.iter().map(|w| (w[0], w[1])).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sequential_plan() {
        let wps = [(41.1861304, -8.70793785), (41.1861082, -8.70654042), (41.186, -8.705)];
        let db = plan_db_entry(&wps, "p1", 1.5).unwrap();

        assert_eq!(db.op, PlanDbOp::Set);
        assert_eq!(db.db_type, PlanDbType::Request);
        assert_eq!(db.plan_id, "p1");

        let spec = db.arg.unwrap();
        assert_eq!(spec.start_man_id, "1");

        let ids: Vec<&str> = spec.maneuvers.iter().map(|m| m.maneuver_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        assert_eq!(spec.transitions.len(), 2);
        assert_eq!(spec.transitions[0].source_man, "1");
        assert_eq!(spec.transitions[0].dest_man, "2");
        assert_eq!(spec.transitions[1].source_man, "2");
        assert_eq!(spec.transitions[1].dest_man, "3");
        assert!(spec.transitions.iter().all(|t| t.conditions == MANEUVER_IS_DONE));

        match &spec.maneuvers[0].data {
            Maneuver::Goto(g) => {
                assert!((g.lat_rad - 41.1861304f64.to_radians()).abs() < 1e-12);
                assert!((g.lon_rad - (-8.70793785f64).to_radians()).abs() < 1e-12);
                assert_eq!(g.speed, 1.5);
                assert_eq!(g.speed_units, SpeedUnits::MetersPs);
            }
            m => panic!("Unexpected maneuver {:?}", m),
        }
    }

    #[test]
    fn test_single_maneuver_has_no_transitions() {
        let spec = plan_db_entry(&[(41.0, -8.0)], "one", 1.0)
            .unwrap()
            .arg
            .unwrap();

        assert_eq!(spec.maneuvers.len(), 1);
        assert!(spec.transitions.is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(plan_db_entry(&[], "p", 1.0), Err(PlanError::NoManeuvers));
        assert_eq!(
            plan_db_entry(&[(41.0, -8.0), (95.0, 0.0)], "p", 1.0),
            Err(PlanError::InvalidWaypoint(1, 95.0, 0.0))
        );
    }

    #[test]
    fn test_start_request() {
        let ctrl = start_request("p1", Some(0x2810));

        assert_eq!(ctrl.ctrl_type, PlanControlType::Request);
        assert_eq!(ctrl.op, PlanControlOp::Start);
        assert!(ctrl.ignore_errors);
        assert_eq!(ctrl.destination, Some(0x2810));
    }
}
