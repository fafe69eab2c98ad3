//! # Follow Executable Parameters
//!
//! This module provides parameters for the follow executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FollowExecParams {
    /// Target period of one cycle
    #[serde(default = "default_cycle_period_s")]
    pub cycle_period_s: f64,

    /// Archive dispatched paths and signals to the session directory
    #[serde(default = "default_true")]
    pub archive: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for FollowExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: default_cycle_period_s(),
            archive: true,
        }
    }
}

fn default_cycle_period_s() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}
