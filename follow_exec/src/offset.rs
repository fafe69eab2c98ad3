//! # Offset projector
//!
//! Rotates the maneuver's body-frame standoff offset by the leader's bearing and displaces the
//! leader's position by the result, giving the waypoint the follower should head for.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::f64::consts::FRAC_PI_2;

use comms_if::bus::{FollowSystem, ZUnits};
use serde::Serialize;
use util::maths::wrap_pi;

use crate::{
    geo::{GeoPoint, Geodesy},
    track::LeaderFix,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The projected standoff waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub point: GeoPoint,

    /// Leader depth plus the maneuver's vertical offset
    pub z_m: f64,

    pub z_units: ZUnits,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// North and east components of the body-frame offset `(x_m, y_m)` for a leader bearing `psi`.
pub fn rotate_offset(psi_rad: f64, x_m: f64, y_m: f64) -> (f64, f64) {
    let lateral_rad = wrap_pi(psi_rad - FRAC_PI_2);

    let north_m = psi_rad.cos() * x_m + lateral_rad.cos() * y_m;
    let east_m = psi_rad.sin() * x_m + lateral_rad.sin() * y_m;

    (north_m, east_m)
}

/// Project the standoff waypoint for the given leader fix.
pub fn project<G: Geodesy>(geo: &G, fix: &LeaderFix, spec: &FollowSystem) -> Waypoint {
    let (north_m, east_m) = rotate_offset(fix.bearing_rad, spec.x_m, spec.y_m);

    Waypoint {
        point: geo.displace(&fix.point, north_m, east_m),
        z_m: fix.depth_m + spec.z_m,
        z_units: spec.z_units,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::Wgs84;
    use comms_if::bus::SpeedUnits;
    use std::f64::consts::PI;

    fn spec(x_m: f64, y_m: f64, z_m: f64) -> FollowSystem {
        FollowSystem {
            system: 1,
            duration_s: 0,
            speed: 1.5,
            speed_units: SpeedUnits::MetersPs,
            x_m,
            y_m,
            z_m,
            z_units: ZUnits::Depth,
            loiter_radius_m: None,
        }
    }

    fn fix(bearing_rad: f64, depth_m: f64) -> LeaderFix {
        LeaderFix {
            point: GeoPoint::from_deg(41.0, -8.0),
            depth_m,
            bearing_rad,
            timestamp_s: 0.0,
        }
    }

    #[test]
    fn test_rotate_offset() {
        let (n, e) = rotate_offset(0.0, 10.0, 0.0);
        assert!((n - 10.0).abs() < 1e-12 && e.abs() < 1e-12);

        // Positive lateral offsets sit to port of the leader
        let (n, e) = rotate_offset(0.0, 0.0, 5.0);
        assert!(n.abs() < 1e-12 && (e + 5.0).abs() < 1e-12);

        let (n, e) = rotate_offset(PI, -10.0, 0.0);
        assert!((n - 10.0).abs() < 1e-12 && e.abs() < 1e-9);
    }

    #[test]
    fn test_project_due_north() {
        let geo = Wgs84;
        let f = fix(0.0, 0.0);
        let wp = project(&geo, &f, &spec(10.0, 0.0, 0.0));

        let ned = geo.displacement(&f.point, &wp.point);
        assert!((ned[0] - 10.0).abs() < 1e-3);
        assert!(ned[1].abs() < 1e-3);
    }

    #[test]
    fn test_project_behind_heading_east() {
        let geo = Wgs84;
        let f = fix(FRAC_PI_2, 0.0);
        let wp = project(&geo, &f, &spec(-20.0, 0.0, 0.0));

        let ned = geo.displacement(&f.point, &wp.point);
        assert!(ned[0].abs() < 1e-3);
        assert!((ned[1] + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_project_depth() {
        let geo = Wgs84;
        let wp = project(&geo, &fix(0.0, 4.0), &spec(0.0, 0.0, 1.5));
        assert_eq!(wp.z_m, 5.5);
        assert_eq!(wp.z_units, ZUnits::Depth);
    }
}
