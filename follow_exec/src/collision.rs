//! # Collision arbiter
//!
//! When the two followers get too close to each other, decides whether this vehicle may keep
//! heading for its candidate waypoint or must hold position.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

use crate::{
    geo::{GeoPoint, Geodesy},
    track::PeerCache,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Outcome of the arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArbiterVerdict {
    /// Clear to continue towards the candidate point
    Proceed,

    /// Hold position
    Yield,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Arbitrate between the followers for the given candidate point.
///
/// The vehicle proceeds only if the candidate is strictly further from the other follower than it
/// is from the reference vehicle. Equal ranges, or a missing peer fix, yield.
pub fn arbitrate<G: Geodesy>(geo: &G, peers: &PeerCache, candidate: &GeoPoint) -> ArbiterVerdict {
    let (reference, other) = match peers.pair() {
        Some(p) => p,
        None => return ArbiterVerdict::Yield,
    };

    let (_, ref_range_m) = geo.bearing_and_range(&reference.point, candidate);
    let (_, other_range_m) = geo.bearing_and_range(&other.point, candidate);

    let verdict = if other_range_m > ref_range_m {
        ArbiterVerdict::Proceed
    } else {
        ArbiterVerdict::Yield
    };

    debug!(
        "Arbitration: reference {:.2} m, other {:.2} m -> {:?}",
        ref_range_m, other_range_m, verdict
    );

    verdict
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::Wgs84;

    fn peers_at(reference: GeoPoint, other: GeoPoint) -> PeerCache {
        let mut peers = PeerCache::new();
        peers.update(3, reference, &[2]);
        peers.update(2, other, &[2]);
        peers
    }

    #[test]
    fn test_proceed_when_other_is_further() {
        let geo = Wgs84;
        let candidate = GeoPoint::from_deg(41.0, -8.0);
        let peers = peers_at(
            geo.displace(&candidate, 5.0, 0.0),
            geo.displace(&candidate, 0.0, 30.0),
        );

        assert_eq!(arbitrate(&geo, &peers, &candidate), ArbiterVerdict::Proceed);
    }

    #[test]
    fn test_yield_when_other_is_closer() {
        let geo = Wgs84;
        let candidate = GeoPoint::from_deg(41.0, -8.0);
        let peers = peers_at(
            geo.displace(&candidate, 30.0, 0.0),
            geo.displace(&candidate, 0.0, 5.0),
        );

        assert_eq!(arbitrate(&geo, &peers, &candidate), ArbiterVerdict::Yield);
    }

    /// Equal ranges are not tie-broken, both followers hold.
    #[test]
    fn test_equal_ranges_yield() {
        let geo = Wgs84;
        let candidate = GeoPoint::from_deg(41.0, -8.0);
        let p = geo.displace(&candidate, 10.0, 10.0);
        let peers = peers_at(p, p);

        assert_eq!(arbitrate(&geo, &peers, &candidate), ArbiterVerdict::Yield);
    }

    #[test]
    fn test_missing_peer_yields() {
        let geo = Wgs84;
        let candidate = GeoPoint::from_deg(41.0, -8.0);
        let mut peers = PeerCache::new();
        peers.update(3, geo.displace(&candidate, 5.0, 0.0), &[2]);

        assert_eq!(arbitrate(&geo, &peers, &candidate), ArbiterVerdict::Yield);
    }
}
