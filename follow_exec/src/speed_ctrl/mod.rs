//! # Speed regulator
//!
//! Closes the loop on the distance between this vehicle and the standoff point. The distance error
//! is scaled down before being fed to a discrete PID controller, whose clamped output is the
//! commanded forward speed.
//!
//! The regulator is owned by the follow manager, which resets it once per activation and steps it
//! once per accepted leader report. Time is always passed in by the caller so that replayed and
//! simulated runs behave exactly like live ones.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod controller;
pub mod params;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use controller::*;
pub use params::Params;
