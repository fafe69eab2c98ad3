//! # Safety monitor
//!
//! Separation checks between this vehicle and the formation. Without an own navigation estimate
//! there is no basis to judge risk, so every check passes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use crate::{
    geo::{GeoPoint, Geodesy},
    track::{OwnState, PeerCache},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Result of a separation check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SafetyVerdict {
    pub safe: bool,

    /// The measured separation, `None` if it could not be measured
    pub range_m: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SafetyVerdict {
    /// A passing verdict with no measurement behind it.
    pub fn unmeasured() -> Self {
        Self {
            safe: true,
            range_m: None,
        }
    }

    /// Verdict for a measured range. A range equal to the safe distance is safe.
    pub fn from_range(range_m: f64, safe_distance_m: f64) -> Self {
        Self {
            safe: range_m >= safe_distance_m,
            range_m: Some(range_m),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Horizontal range between this vehicle and a point.
pub fn own_range<G: Geodesy>(geo: &G, own: &OwnState, point: &GeoPoint) -> f64 {
    let ned = geo.displacement(&own.origin, point);
    (ned[0] - own.x_m).hypot(ned[1] - own.y_m)
}

/// Check the separation between this vehicle and a point near the leader.
///
/// The range is also the live separation used by the speed regulator.
pub fn leader_separation<G: Geodesy>(
    geo: &G,
    own: Option<&OwnState>,
    point: &GeoPoint,
    safe_distance_m: f64,
) -> SafetyVerdict {
    match own {
        Some(own) => SafetyVerdict::from_range(own_range(geo, own, point), safe_distance_m),
        None => SafetyVerdict::unmeasured(),
    }
}

/// Check the separation between the reference vehicle and the other follower.
///
/// Passes if the own state or either peer fix is unknown.
pub fn peer_separation<G: Geodesy>(
    geo: &G,
    own: Option<&OwnState>,
    peers: &PeerCache,
    safe_distance_m: f64,
) -> SafetyVerdict {
    if own.is_none() {
        return SafetyVerdict::unmeasured();
    }

    match peers.pair() {
        Some((reference, other)) => {
            let (_, range_m) = geo.bearing_and_range(&reference.point, &other.point);
            SafetyVerdict::from_range(range_m, safe_distance_m)
        }
        None => SafetyVerdict::unmeasured(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::Wgs84;
    use nalgebra::Vector3;

    /// Flat earth where one radian is one meter, so ranges are exact.
    struct Flat;

    impl Geodesy for Flat {
        fn displacement(&self, from: &GeoPoint, to: &GeoPoint) -> Vector3<f64> {
            Vector3::new(to.lat_rad - from.lat_rad, to.lon_rad - from.lon_rad, 0.0)
        }

        fn displace(&self, origin: &GeoPoint, north_m: f64, east_m: f64) -> GeoPoint {
            GeoPoint::new(origin.lat_rad + north_m, origin.lon_rad + east_m)
        }
    }

    fn own_at(x_m: f64, y_m: f64) -> OwnState {
        OwnState {
            origin: GeoPoint::new(0.0, 0.0),
            x_m,
            y_m,
            z_m: 0.0,
        }
    }

    #[test]
    fn test_no_own_state_is_safe() {
        let v = leader_separation(&Flat, None, &GeoPoint::new(0.0, 0.0), 15.0);
        assert!(v.safe);
        assert!(v.range_m.is_none());

        let mut peers = PeerCache::new();
        peers.update(1, GeoPoint::new(0.0, 0.0), &[2]);
        peers.update(2, GeoPoint::new(0.0, 1.0), &[2]);
        assert!(peer_separation(&Flat, None, &peers, 15.0).safe);
    }

    #[test]
    fn test_leader_separation_boundary() {
        let target = GeoPoint::new(15.0, 0.0);

        // Own state is 15 m from the target, which is just safe
        let v = leader_separation(&Flat, Some(&own_at(0.0, 0.0)), &target, 15.0);
        assert!(v.safe);
        assert_eq!(v.range_m, Some(15.0));

        for r in [0.0, 5.0, 14.999].iter() {
            let v = leader_separation(&Flat, Some(&own_at(15.0 - r, 0.0)), &target, 15.0);
            assert!(!v.safe, "range {} should be unsafe", r);
        }

        for r in [15.0, 15.001, 100.0].iter() {
            let v = leader_separation(&Flat, Some(&own_at(15.0 - r, 0.0)), &target, 15.0);
            assert!(v.safe, "range {} should be safe", r);
        }
    }

    #[test]
    fn test_own_offset_from_origin() {
        let own = OwnState {
            origin: GeoPoint::from_deg(41.0, -8.0),
            x_m: 3.0,
            y_m: 4.0,
            z_m: 0.0,
        };
        let range_m = own_range(&Wgs84, &own, &own.origin);
        assert!((range_m - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_peer_separation() {
        let own = own_at(0.0, 0.0);
        let mut peers = PeerCache::new();

        peers.update(1, GeoPoint::new(0.0, 0.0), &[2]);
        assert!(peer_separation(&Flat, Some(&own), &peers, 15.0).safe);

        peers.update(2, GeoPoint::new(0.0, 20.0), &[2]);
        let v = peer_separation(&Flat, Some(&own), &peers, 15.0);
        assert!(v.safe);
        assert_eq!(v.range_m, Some(20.0));

        peers.update(2, GeoPoint::new(0.0, 10.0), &[2]);
        assert!(!peer_separation(&Flat, Some(&own), &peers, 15.0).safe);
    }
}
