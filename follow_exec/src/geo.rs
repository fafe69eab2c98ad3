//! # Geodesy adapter
//!
//! Short-range geometry between geodetic positions. Positions are converted to Earth-Centred
//! Earth-Fixed (ECEF) coordinates on the WGS-84 ellipsoid and differences are rotated into the
//! local north-east-down (NED) tangent plane of the origin point.
//!
//! All positions handled here lie on the ellipsoid surface, vertical references are handled by
//! the callers.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// WGS-84 semi-major axis
pub const WGS84_A_M: f64 = 6_378_137.0;

/// WGS-84 first eccentricity squared
pub const WGS84_E2: f64 = 0.006_694_379_990_13;

/// Number of refinement iterations when converting from ECEF back to geodetic coordinates
const ECEF_TO_GEO_ITERS: usize = 6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat_rad: f64,
    pub lon_rad: f64,
}

/// WGS-84 implementation of [`Geodesy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Conversions between geodetic positions and the local tangent plane.
pub trait Geodesy {
    /// Displacement from `from` to `to` in the NED frame centred on `from`.
    fn displacement(&self, from: &GeoPoint, to: &GeoPoint) -> Vector3<f64>;

    /// Displace `origin` by the given north and east offsets.
    fn displace(&self, origin: &GeoPoint, north_m: f64, east_m: f64) -> GeoPoint;

    /// Bearing (clockwise from north, in [-pi, pi]) and horizontal range from `from` to `to`.
    fn bearing_and_range(&self, from: &GeoPoint, to: &GeoPoint) -> (f64, f64) {
        let ned = self.displacement(from, to);
        (ned[1].atan2(ned[0]), ned[0].hypot(ned[1]))
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GeoPoint {
    pub fn new(lat_rad: f64, lon_rad: f64) -> Self {
        Self { lat_rad, lon_rad }
    }

    /// Build a point from a latitude and longitude in degrees.
    pub fn from_deg(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat_rad: lat_deg.to_radians(),
            lon_rad: lon_deg.to_radians(),
        }
    }
}

impl Wgs84 {
    /// Prime vertical radius of curvature at the given latitude.
    fn n_rad(lat_rad: f64) -> f64 {
        WGS84_A_M / (1.0 - WGS84_E2 * lat_rad.sin().powi(2)).sqrt()
    }

    /// Convert a geodetic point at the given height above the ellipsoid to ECEF.
    pub fn to_ecef(point: &GeoPoint, height_m: f64) -> Vector3<f64> {
        let (slat, clat) = point.lat_rad.sin_cos();
        let (slon, clon) = point.lon_rad.sin_cos();
        let n = Self::n_rad(point.lat_rad);

        Vector3::new(
            (n + height_m) * clat * clon,
            (n + height_m) * clat * slon,
            (n * (1.0 - WGS84_E2) + height_m) * slat,
        )
    }

    /// Convert an ECEF position back to a geodetic point and its height above the ellipsoid.
    pub fn from_ecef(ecef: &Vector3<f64>) -> (GeoPoint, f64) {
        let p = ecef[0].hypot(ecef[1]);
        let lon_rad = ecef[1].atan2(ecef[0]);

        let mut lat_rad = ecef[2].atan2(p * (1.0 - WGS84_E2));
        let mut height_m = 0.0;

        for _ in 0..ECEF_TO_GEO_ITERS {
            let n = Self::n_rad(lat_rad);
            height_m = p / lat_rad.cos() - n;
            lat_rad = ecef[2].atan2(p * (1.0 - WGS84_E2 * n / (n + height_m)));
        }

        (GeoPoint::new(lat_rad, lon_rad), height_m)
    }

    /// Rotation from ECEF into the NED frame at the given point.
    #[rustfmt::skip]
    fn ecef_to_ned(point: &GeoPoint) -> Matrix3<f64> {
        let (slat, clat) = point.lat_rad.sin_cos();
        let (slon, clon) = point.lon_rad.sin_cos();

        Matrix3::new(
            -slat * clon, -slat * slon, clat,
            -slon, clon, 0.0,
            -clat * clon, -clat * slon, -slat,
        )
    }
}

impl Geodesy for Wgs84 {
    fn displacement(&self, from: &GeoPoint, to: &GeoPoint) -> Vector3<f64> {
        let delta = Self::to_ecef(to, 0.0) - Self::to_ecef(from, 0.0);
        Self::ecef_to_ned(from) * delta
    }

    fn displace(&self, origin: &GeoPoint, north_m: f64, east_m: f64) -> GeoPoint {
        let ned = Vector3::new(north_m, east_m, 0.0);
        let ecef = Self::to_ecef(origin, 0.0) + Self::ecef_to_ned(origin).transpose() * ned;

        Self::from_ecef(&ecef).0
    }
}
