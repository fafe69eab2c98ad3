//! Speed regulator parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the speed regulator
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Minimum speed demand
    pub output_min: f64,

    /// Maximum speed demand
    pub output_max: f64,

    /// Symmetric limit on the integral term
    pub integral_limit: f64,

    /// The distance error in meters is divided by this before being passed to the controller.
    pub error_scale: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 0.08,
            k_i: 0.068,
            k_d: 0.0525,
            output_min: 0.4,
            output_max: 4.0,
            integral_limit: 1.5,
            error_scale: 10.0,
        }
    }
}
