//! # Data Store
//!
//! Per-cycle data of the follow executable, and the flat records written to the session archives.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bus::{DesiredPath, MnvrSignal};
use serde::Serialize;

use crate::follow_mgr::StepOutput;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Session elapsed time at the start of the cycle
    pub sim_time_s: f64,

    /// Time at which the next state report is due
    pub next_report_time_s: f64,

    // Follow maneuver
    /// Paths dispatched during this cycle
    pub paths: Vec<DesiredPath>,

    /// Signals raised during this cycle
    pub signals: Vec<MnvrSignal>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of paths dispatched
    pub num_paths: u64,
}

/// Archive row for a dispatched path.
#[derive(Debug, Clone, Serialize)]
pub struct PathRecord {
    pub time_s: f64,
    pub end_lat_rad: f64,
    pub end_lon_rad: f64,
    pub end_z_m: f64,
    pub lradius_m: f64,
    pub speed: f64,
}

/// Archive row for a supervisor signal.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRecord {
    pub time_s: f64,
    pub kind: &'static str,
    pub time_left_s: Option<f64>,
    pub fraction: Option<f64>,
    pub message: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self, time_s: f64) {
        self.paths.clear();
        self.signals.clear();
        self.sim_time_s = time_s;
    }

    /// Store the output of a follow manager handler.
    pub fn push_output(&mut self, output: StepOutput) {
        if let Some(path) = output.path {
            self.paths.push(path);
            self.num_paths += 1;
        }
        self.signals.extend(output.signals);
    }

    /// True if the state report is due, in which case the next one is scheduled.
    pub fn report_due(&mut self, period_s: f64) -> bool {
        if self.sim_time_s >= self.next_report_time_s {
            self.next_report_time_s = self.sim_time_s + period_s;
            true
        } else {
            false
        }
    }
}

impl PathRecord {
    pub fn new(time_s: f64, path: &DesiredPath) -> Self {
        Self {
            time_s,
            end_lat_rad: path.end_lat_rad,
            end_lon_rad: path.end_lon_rad,
            end_z_m: path.end_z_m,
            lradius_m: path.lradius_m,
            speed: path.speed,
        }
    }
}

impl SignalRecord {
    pub fn new(time_s: f64, signal: &MnvrSignal) -> Self {
        let mut rec = Self {
            time_s,
            kind: "",
            time_left_s: None,
            fraction: None,
            message: None,
        };

        match signal {
            MnvrSignal::Progress {
                time_left_s,
                fraction,
            } => {
                rec.kind = "progress";
                rec.time_left_s = Some(*time_left_s);
                rec.fraction = Some(*fraction);
            }
            MnvrSignal::Completed => rec.kind = "completed",
            MnvrSignal::Error(e) => {
                rec.kind = "error";
                rec.message = Some(e.clone());
            }
        }

        rec
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_report_schedule() {
        let mut ds = DataStore::default();

        ds.cycle_start(0.0);
        assert!(ds.report_due(1.0));

        ds.cycle_start(0.5);
        assert!(!ds.report_due(1.0));

        ds.cycle_start(1.05);
        assert!(ds.report_due(1.0));
        assert!((ds.next_report_time_s - 2.05).abs() < 1e-9);
    }

    #[test]
    fn test_signal_record() {
        let rec = SignalRecord::new(
            3.0,
            &MnvrSignal::Progress {
                time_left_s: 7.0,
                fraction: 0.3,
            },
        );
        assert_eq!(rec.kind, "progress");
        assert_eq!(rec.time_left_s, Some(7.0));

        let rec = SignalRecord::new(4.0, &MnvrSignal::Error(String::from("stale")));
        assert_eq!(rec.kind, "error");
        assert_eq!(rec.message.as_deref(), Some("stale"));
    }
}
