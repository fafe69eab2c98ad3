//! # Leader track tracker
//!
//! Fuses the leader's position reports into a single [`LeaderFix`], and caches the positions of
//! the other vehicles in the formation for the collision checks.
//!
//! Each record has exactly one writer: the tracker owns the leader fix, the [`PeerCache`] owns the
//! peer fixes, so reports from different sources may arrive interleaved in any order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bus::{EstimatedState, SystemId};
use log::trace;
use serde::Serialize;

use crate::geo::{GeoPoint, Geodesy};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Last known state of the leader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeaderFix {
    pub point: GeoPoint,

    /// Leader depth, zero for beacon based fixes
    pub depth_m: f64,

    /// Bearing used to rotate the standoff offset
    pub bearing_rad: f64,

    /// Timestamp of the report which produced this fix
    pub timestamp_s: f64,
}

/// Last known position of another vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeerFix {
    pub source: SystemId,
    pub point: GeoPoint,
}

/// This vehicle's own navigation estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OwnState {
    /// Reference point of the local frame
    pub origin: GeoPoint,

    /// North offset from the origin
    pub x_m: f64,

    /// East offset from the origin
    pub y_m: f64,

    /// Down offset from the origin
    pub z_m: f64,
}

/// Tracks the leader's fix and the bearing used for projection.
#[derive(Debug, Clone, Default)]
pub struct LeaderTracker {
    fix: Option<LeaderFix>,
}

/// Positions of the two other vehicles relevant to collision avoidance.
#[derive(Debug, Clone, Default)]
pub struct PeerCache {
    /// The reference vehicle, any non-leader, non-peer source
    reference: Option<PeerFix>,

    /// The other follower
    other: Option<PeerFix>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LeaderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the leader, the next accepted report will be treated as the first.
    pub fn reset(&mut self) {
        self.fix = None;
    }

    /// Accept a beacon from the leader and return the resulting fix.
    ///
    /// The first fix after a reset uses a bearing of zero. Afterwards the bearing is that of the
    /// displacement from the previous fix, unless the leader moved less than `min_displace_m`, in
    /// which case the previous bearing is kept. A `heading_override` replaces the computed bearing
    /// on every fix but the first.
    pub fn accept_beacon<G: Geodesy>(
        &mut self,
        geo: &G,
        point: GeoPoint,
        timestamp_s: f64,
        min_displace_m: f64,
        heading_override: Option<f64>,
    ) -> LeaderFix {
        let bearing_rad = match self.fix {
            None => 0.0,
            Some(ref prev) => {
                let (bearing_rad, displace_m) = geo.bearing_and_range(&prev.point, &point);

                let bearing_rad = if displace_m < min_displace_m {
                    prev.bearing_rad
                } else {
                    bearing_rad
                };

                trace!(
                    "Leader displaced {:.2} m, bearing {:.4} rad",
                    displace_m,
                    bearing_rad
                );

                heading_override.unwrap_or(bearing_rad)
            }
        };

        let fix = LeaderFix {
            point,
            depth_m: 0.0,
            bearing_rad,
            timestamp_s,
        };
        self.fix = Some(fix);

        fix
    }

    /// Accept a remote state from the leader, which carries its own heading and depth.
    pub fn accept_remote(
        &mut self,
        point: GeoPoint,
        depth_m: f64,
        psi_rad: f64,
        timestamp_s: f64,
    ) -> LeaderFix {
        let fix = LeaderFix {
            point,
            depth_m,
            bearing_rad: psi_rad,
            timestamp_s,
        };
        self.fix = Some(fix);

        fix
    }

    pub fn fix(&self) -> Option<&LeaderFix> {
        self.fix.as_ref()
    }

    pub fn bearing(&self) -> Option<f64> {
        self.fix.map(|f| f.bearing_rad)
    }
}

impl PeerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a beacon from a non-leader vehicle.
    ///
    /// Sources listed in `peer_ids` are the other follower, anything else is the reference
    /// vehicle.
    pub fn update(&mut self, source: SystemId, point: GeoPoint, peer_ids: &[SystemId]) {
        let fix = Some(PeerFix { source, point });

        if peer_ids.contains(&source) {
            self.other = fix;
        } else {
            self.reference = fix;
        }
    }

    pub fn reference(&self) -> Option<&PeerFix> {
        self.reference.as_ref()
    }

    pub fn other(&self) -> Option<&PeerFix> {
        self.other.as_ref()
    }

    /// Both fixes, if both are known.
    pub fn pair(&self) -> Option<(&PeerFix, &PeerFix)> {
        match (self.reference.as_ref(), self.other.as_ref()) {
            (Some(r), Some(o)) => Some((r, o)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.reference = None;
        self.other = None;
    }
}

impl From<&EstimatedState> for OwnState {
    fn from(msg: &EstimatedState) -> Self {
        Self {
            origin: GeoPoint::new(msg.lat_rad, msg.lon_rad),
            x_m: msg.x_m,
            y_m: msg.y_m,
            z_m: msg.z_m,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::Wgs84;
    use std::f64::consts::FRAC_PI_2;

    const MIN_DISPLACE_M: f64 = 2.0;

    #[test]
    fn test_first_fix_bearing_zero() {
        let geo = Wgs84;
        let mut tracker = LeaderTracker::new();
        let p = GeoPoint::from_deg(41.0, -8.0);

        let fix = tracker.accept_beacon(&geo, p, 0.0, MIN_DISPLACE_M, Some(1.0));
        assert_eq!(fix.bearing_rad, 0.0);
        assert_eq!(fix.depth_m, 0.0);
    }

    #[test]
    fn test_bearing_from_displacement() {
        let geo = Wgs84;
        let mut tracker = LeaderTracker::new();
        let p0 = GeoPoint::from_deg(41.0, -8.0);

        tracker.accept_beacon(&geo, p0, 0.0, MIN_DISPLACE_M, None);
        let fix = tracker.accept_beacon(
            &geo,
            geo.displace(&p0, 0.0, 10.0),
            1.0,
            MIN_DISPLACE_M,
            None,
        );

        assert!((fix.bearing_rad - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(tracker.bearing(), Some(fix.bearing_rad));
    }

    #[test]
    fn test_bearing_stable_under_jitter() {
        let geo = Wgs84;
        let mut tracker = LeaderTracker::new();
        let p0 = GeoPoint::from_deg(41.0, -8.0);
        let p1 = geo.displace(&p0, 10.0, 10.0);

        tracker.accept_beacon(&geo, p0, 0.0, MIN_DISPLACE_M, None);
        let moved = tracker.accept_beacon(&geo, p1, 1.0, MIN_DISPLACE_M, None);

        // Small hops in every direction must leave the bearing alone
        let mut last = p1;
        for (i, (n, e)) in [(1.0, 0.0), (0.0, -1.5), (-1.9, 0.0), (0.5, 0.5)]
            .iter()
            .enumerate()
        {
            last = geo.displace(&last, *n, *e);
            let fix = tracker.accept_beacon(&geo, last, 2.0 + i as f64, MIN_DISPLACE_M, None);
            assert_eq!(fix.bearing_rad, moved.bearing_rad);
        }
    }

    #[test]
    fn test_heading_override() {
        let geo = Wgs84;
        let mut tracker = LeaderTracker::new();
        let p0 = GeoPoint::from_deg(41.0, -8.0);

        tracker.accept_beacon(&geo, p0, 0.0, MIN_DISPLACE_M, None);
        let fix = tracker.accept_beacon(
            &geo,
            geo.displace(&p0, 20.0, 0.0),
            1.0,
            MIN_DISPLACE_M,
            Some(1.2),
        );
        assert_eq!(fix.bearing_rad, 1.2);
    }

    #[test]
    fn test_remote_fix() {
        let mut tracker = LeaderTracker::new();
        let fix = tracker.accept_remote(GeoPoint::from_deg(41.0, -8.0), 3.0, 0.7, 5.0);

        assert_eq!(fix.depth_m, 3.0);
        assert_eq!(fix.bearing_rad, 0.7);
        assert_eq!(tracker.fix(), Some(&fix));

        tracker.reset();
        assert!(tracker.fix().is_none());
    }

    #[test]
    fn test_peer_routing() {
        let mut peers = PeerCache::new();
        let p = GeoPoint::from_deg(41.0, -8.0);

        peers.update(7, p, &[8, 9]);
        assert!(peers.pair().is_none());
        assert_eq!(peers.reference().map(|f| f.source), Some(7));

        peers.update(9, p, &[8, 9]);
        assert_eq!(peers.other().map(|f| f.source), Some(9));
        assert!(peers.pair().is_some());

        peers.clear();
        assert!(peers.reference().is_none());
        assert!(peers.other().is_none());
    }
}
