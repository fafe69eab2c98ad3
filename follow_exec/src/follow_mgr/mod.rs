//! # FollowMgr module
//!
//! This module implements the [`FollowMgr`], which runs the leader-follower formation maneuver.
//! The manager is driven entirely by its handlers: one per kind of bus report, plus the periodic
//! [`FollowMgr::on_state_report`] tick which detects a stale leader and the end of the maneuver.
//!
//! Handlers never block and never overlap. Every handler takes the current time explicitly and
//! returns a [`StepOutput`] holding the path command to dispatch, if any, and the advisory signals
//! for the mission supervisor.
//!
//! The maneuver's states are described in [`state::FollowState`]:
//!
//! - `Idle` - No maneuver is bound, leader and peer reports are ignored.
//! - `Armed` - A maneuver was activated, waiting for the first leader report.
//! - `Tracking` - Each accepted leader report produces a path command.
//! - `Holding` - A safety or collision check failed, movement is disabled until a report passes.
//! - `Completed` - The maneuver's duration has elapsed.
//! - `TimedOut` - No leader report for longer than the timeout. This is advisory, the next accepted
//!   leader report resumes the maneuver.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
pub mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bus::{
    Announce, BusMsg, DesiredPath, EstimatedState, FollowSystem, MnvrSignal, PathControlState,
    RemoteState, SystemId,
};
use log::{debug, error, info, trace, warn};

pub use self::params::{FollowParams, ParamsError};
use self::state::{FollowEvent, FollowState, HoldCause};

use crate::{
    collision::{self, ArbiterVerdict},
    geo::{GeoPoint, Geodesy, Wgs84},
    offset,
    safety,
    speed_ctrl::SpeedRegulator,
    timer::Deadline,
    track::{LeaderFix, LeaderTracker, OwnState, PeerCache},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Follow maneuver manager
pub struct FollowMgr<G: Geodesy = Wgs84> {
    params: FollowParams,

    geo: G,

    state: FollowState,

    /// The bound maneuver, `None` while idle
    spec: Option<FollowSystem>,

    /// Time at which the maneuver was activated
    start_time_s: f64,

    tracker: LeaderTracker,

    peers: PeerCache,

    own: Option<OwnState>,

    regulator: SpeedRegulator,

    /// Expires when the leader hasn't been heard from for `timeout_s`
    staleness: Deadline,

    /// Expires when the last remote state heading is older than `heading_cooldown_s`
    heading: Deadline,

    /// Heading from the last remote state report since activation
    remote_heading: Option<f64>,

    /// True until the first path command after activation has been dispatched
    first_cycle: bool,
}

/// Output of a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    /// Path command to dispatch
    pub path: Option<DesiredPath>,

    /// Signals for the mission supervisor
    pub signals: Vec<MnvrSignal>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the follow manager.
#[derive(Debug, thiserror::Error)]
pub enum FollowMgrError {
    #[error("Failed to load FollowParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("Cannot follow system {0}, it is this vehicle")]
    LeaderIsSelf(SystemId),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FollowMgr<Wgs84> {
    /// Load the parameters from the given file under the software root and create the manager.
    pub fn init(params_path: &str) -> Result<Self, FollowMgrError> {
        let params: FollowParams =
            util::params::load(params_path).map_err(FollowMgrError::ParamLoadError)?;

        Self::new(params)
    }

    /// Create a new idle manager.
    pub fn new(params: FollowParams) -> Result<Self, FollowMgrError> {
        Self::with_geodesy(params, Wgs84)
    }
}

impl<G: Geodesy> FollowMgr<G> {
    /// Create a new idle manager using the given geodesy implementation.
    pub fn with_geodesy(params: FollowParams, geo: G) -> Result<Self, FollowMgrError> {
        params.validate().map_err(FollowMgrError::InvalidParams)?;

        Ok(Self {
            geo,
            state: FollowState::Idle,
            spec: None,
            start_time_s: 0.0,
            tracker: LeaderTracker::new(),
            peers: PeerCache::new(),
            own: None,
            regulator: SpeedRegulator::new(params.speed_ctrl),
            staleness: Deadline::new(params.timeout_s),
            heading: Deadline::new(params.heading_cooldown_s),
            remote_heading: None,
            first_cycle: true,
            params,
        })
    }

    /// Bind a maneuver, starting it from `now_s`.
    ///
    /// Activating while a maneuver is already bound replaces it.
    pub fn activate(&mut self, spec: FollowSystem, now_s: f64) -> Result<(), FollowMgrError> {
        if spec.system == self.params.own_id {
            return Err(FollowMgrError::LeaderIsSelf(spec.system));
        }

        if self.state.is_running() {
            info!("Replacing the active maneuver");
        }

        info!(
            "Following system {} at offset ({:.1}, {:.1}, {:.1}) m",
            spec.system, spec.x_m, spec.y_m, spec.z_m
        );

        self.spec = Some(spec);
        self.start_time_s = now_s;
        self.tracker.reset();
        self.regulator.reset_with(self.params.speed_ctrl);
        self.staleness.reset(now_s);
        self.heading.reset(now_s);
        self.remote_heading = None;
        self.first_cycle = true;

        self.apply(FollowEvent::Activate);

        Ok(())
    }

    /// Unbind the maneuver and forget every fix.
    pub fn deactivate(&mut self) {
        if self.state != FollowState::Idle {
            info!("Maneuver deactivated");
        }

        self.spec = None;
        self.tracker.reset();
        self.peers.clear();
        self.own = None;
        self.regulator.reset();
        self.remote_heading = None;

        self.apply(FollowEvent::Deactivate);
    }

    /// Dispatch a bus message to the matching handler.
    pub fn on_bus_msg(&mut self, msg: &BusMsg, now_s: f64) -> StepOutput {
        match msg {
            BusMsg::Announce(m) => self.on_announce(m, now_s),
            BusMsg::RemoteState(m) => self.on_remote_state(m, now_s),
            BusMsg::EstimatedState(m) => self.on_estimated_state(m),
            BusMsg::PathControlState(m) => self.on_path_control_state(m),
            BusMsg::FollowSystem(spec) => match self.activate(*spec, now_s) {
                Ok(()) => StepOutput::none(),
                Err(e) => {
                    error!("Activation rejected: {}", e);
                    StepOutput::signal(MnvrSignal::Error(e.to_string()))
                }
            },
            BusMsg::StopManeuver => {
                self.deactivate();
                StepOutput::none()
            }
        }
    }

    /// Handle a beacon from any vehicle.
    pub fn on_announce(&mut self, msg: &Announce, now_s: f64) -> StepOutput {
        let leader = match self.leader() {
            Some(l) => l,
            None => return StepOutput::none(),
        };

        if msg.source == self.params.own_id {
            return StepOutput::none();
        }

        let point = GeoPoint::new(msg.lat_rad, msg.lon_rad);

        if msg.source != leader {
            self.peers.update(msg.source, point, &self.params.peer_ids);
            return StepOutput::none();
        }

        if !self.params.use_announce {
            trace!("Ignoring leader beacon, beacon tracking is disabled");
            return StepOutput::none();
        }

        self.staleness.reset(now_s);

        let heading_override = match self.remote_heading {
            Some(psi) if !self.heading.overflow(now_s) => Some(psi),
            _ => None,
        };

        let fix = self.tracker.accept_beacon(
            &self.geo,
            point,
            msg.timestamp_s,
            self.params.min_displace_m,
            heading_override,
        );

        self.process_fix(fix, now_s)
    }

    /// Handle a remote state report, only the leader's are used.
    pub fn on_remote_state(&mut self, msg: &RemoteState, now_s: f64) -> StepOutput {
        match self.leader() {
            Some(leader) if leader == msg.source => (),
            _ => return StepOutput::none(),
        }

        if !self.params.use_remote_state {
            trace!("Ignoring leader remote state, remote state tracking is disabled");
            return StepOutput::none();
        }

        self.staleness.reset(now_s);
        self.heading.reset(now_s);
        self.remote_heading = Some(msg.psi_rad);

        let fix = self.tracker.accept_remote(
            GeoPoint::new(msg.lat_rad, msg.lon_rad),
            msg.depth_m,
            msg.psi_rad,
            msg.timestamp_s,
        );

        self.process_fix(fix, now_s)
    }

    /// Handle a navigation estimate, only this vehicle's own are used.
    pub fn on_estimated_state(&mut self, msg: &EstimatedState) -> StepOutput {
        if msg.source == self.params.own_id {
            self.own = Some(OwnState::from(msg));
        }

        StepOutput::none()
    }

    /// Handle a notification from the path follower.
    pub fn on_path_control_state(&mut self, msg: &PathControlState) -> StepOutput {
        if msg.near {
            debug!("Near the end of the path, disabling movement");
            self.apply(FollowEvent::Disable(HoldCause::NearEnd));
        }

        StepOutput::none()
    }

    /// Periodic tick, run independently of report arrival.
    pub fn on_state_report(&mut self, now_s: f64) -> StepOutput {
        let spec = match self.spec {
            Some(s) if self.state.is_running() => s,
            _ => return StepOutput::none(),
        };

        let mut out = StepOutput::none();

        // Check the current position against the last known leader position
        if self.state.is_moving() {
            if let Some(fix) = self.tracker.fix() {
                let verdict = safety::leader_separation(
                    &self.geo,
                    self.own.as_ref(),
                    &fix.point,
                    self.params.safe_distance_m,
                );

                if !verdict.safe {
                    debug!("Too close to the leader ({:?} m), holding", verdict.range_m);
                    self.apply(FollowEvent::Disable(HoldCause::Unsafe));
                }
            }
        }

        if self.staleness.overflow(now_s) && self.state != FollowState::TimedOut {
            warn!(
                "No report from the leader for {:.1} s",
                self.staleness.period()
            );
            self.apply(FollowEvent::Stale);
            out.signals
                .push(MnvrSignal::Error(String::from("leader reports have timed out")));
        }

        if spec.duration_s > 0 {
            let duration_s = spec.duration_s as f64;
            let elapsed_s = now_s - self.start_time_s;

            if elapsed_s >= duration_s {
                info!("Maneuver completed after {:.1} s", elapsed_s);
                self.apply(FollowEvent::Elapsed);
                out.signals.push(MnvrSignal::Completed);
            } else {
                out.signals.push(MnvrSignal::Progress {
                    time_left_s: duration_s - elapsed_s,
                    fraction: elapsed_s / duration_s,
                });
            }
        }

        out
    }

    /// Replace the parameters.
    ///
    /// A changed timeout or heading cooldown re-arms its deadline from `now_s`. New speed regulator
    /// gains apply from the next activation.
    pub fn update_params(
        &mut self,
        params: FollowParams,
        now_s: f64,
    ) -> Result<(), FollowMgrError> {
        params.validate().map_err(FollowMgrError::InvalidParams)?;

        if (params.timeout_s - self.params.timeout_s).abs() > std::f64::EPSILON {
            self.staleness.set_period(params.timeout_s, now_s);
        }

        if (params.heading_cooldown_s - self.params.heading_cooldown_s).abs() > std::f64::EPSILON {
            self.heading.set_period(params.heading_cooldown_s, now_s);
        }

        info!("Parameters updated");
        self.params = params;

        Ok(())
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn params(&self) -> &FollowParams {
        &self.params
    }

    pub fn spec(&self) -> Option<&FollowSystem> {
        self.spec.as_ref()
    }

    pub fn leader_fix(&self) -> Option<&LeaderFix> {
        self.tracker.fix()
    }

    pub fn peers(&self) -> &PeerCache {
        &self.peers
    }

    pub fn own_state(&self) -> Option<&OwnState> {
        self.own.as_ref()
    }

    pub fn regulator(&self) -> &SpeedRegulator {
        &self.regulator
    }

    /// The leader of the running maneuver.
    fn leader(&self) -> Option<SystemId> {
        match self.spec {
            Some(ref s) if self.state.is_running() => Some(s.system),
            _ => None,
        }
    }

    /// Run the checks on a new leader fix and build the path command if they pass.
    fn process_fix(&mut self, fix: LeaderFix, now_s: f64) -> StepOutput {
        let spec = match self.spec {
            Some(s) => s,
            None => return StepOutput::none(),
        };

        let waypoint = offset::project(&self.geo, &fix, &spec);
        trace!(
            "Leader bearing {:.4} rad, waypoint ({:.7}, {:.7}) rad",
            fix.bearing_rad,
            waypoint.point.lat_rad,
            waypoint.point.lon_rad
        );

        let verdict = safety::leader_separation(
            &self.geo,
            self.own.as_ref(),
            &waypoint.point,
            self.params.safe_distance_m,
        );

        if !verdict.safe {
            debug!("Too close to the waypoint ({:?} m), holding", verdict.range_m);
            self.apply(FollowEvent::Blocked(HoldCause::Unsafe));
            return StepOutput::none();
        }

        if self.params.anti_collision {
            let peer_verdict = safety::peer_separation(
                &self.geo,
                self.own.as_ref(),
                &self.peers,
                self.params.safe_distance_m,
            );

            if !peer_verdict.safe
                && collision::arbitrate(&self.geo, &self.peers, &fix.point) == ArbiterVerdict::Yield
            {
                debug!("Yielding to the other follower");
                self.apply(FollowEvent::Blocked(HoldCause::Collision));
                return StepOutput::none();
            }
        }

        let speed = if self.first_cycle {
            self.first_cycle = false;
            self.regulator.prime(now_s);
            spec.speed
        } else {
            match verdict.range_m {
                Some(range_m) => {
                    let error = (range_m - self.params.desired_distance_m)
                        / self.params.speed_ctrl.error_scale;
                    self.regulator.step(now_s, error)
                }
                None => spec.speed,
            }
        };

        let path = DesiredPath {
            end_lat_rad: waypoint.point.lat_rad,
            end_lon_rad: waypoint.point.lon_rad,
            end_z_m: waypoint.z_m,
            end_z_units: waypoint.z_units,
            lradius_m: spec.loiter_radius_m.unwrap_or(self.params.loiter_radius_m),
            speed,
            speed_units: spec.speed_units,
            direct: true,
        };

        self.apply(FollowEvent::Cleared);

        StepOutput {
            path: Some(path),
            signals: Vec::new(),
        }
    }

    /// Apply an event to the state machine, logging any change.
    fn apply(&mut self, event: FollowEvent) {
        let next = self.state.next(event);

        if next != self.state {
            info!("FollowMgr state change: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

impl StepOutput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn signal(signal: MnvrSignal) -> Self {
        Self {
            path: None,
            signals: vec![signal],
        }
    }

    pub fn is_none(&self) -> bool {
        self.path.is_none() && self.signals.is_empty()
    }
}
