//! # Follow library.
//!
//! Formation control for a follower vehicle: track a leader, hold a standoff waypoint offset from
//! the leader's track, regulate speed to keep the inter-vehicle distance, and hold position when
//! the formation gets too tight.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Geodesy adapter - bearing, range and displacement on the WGS-84 ellipsoid
pub mod geo;

/// Deadline timers used for staleness and heading cooldown
pub mod timer;

/// Leader track tracker and peer position cache
pub mod track;

/// Offset projector - standoff waypoint from the leader's fix
pub mod offset;

/// Safety monitor - leader and peer separation checks
pub mod safety;

/// Collision arbiter - decides which follower yields
pub mod collision;

/// Speed regulator - PID on the inter-vehicle distance error
pub mod speed_ctrl;

/// Follow manager - the maneuver state machine
pub mod follow_mgr;

/// Plan builder - assembles and starts sequential mission plans
pub mod plan;

/// Executable parameters
pub mod params;

/// Executable data store
pub mod data_store;
