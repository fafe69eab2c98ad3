//! # Communications interface crate.
//!
//! Provides the message definitions exchanged between the formation software and the host
//! message bus.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Position reports, maneuver payloads and path commands carried on the bus
pub mod bus;

/// Mission plan messages
pub mod plan;
