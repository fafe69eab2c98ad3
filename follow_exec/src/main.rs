//! Main follower-side executable entry point.
//!
//! # Architecture
//!
//! The executable replays a bus script into the follow maneuver:
//!
//!     - Initialise the session, logging and parameters
//!     - Main loop:
//!         - Deliver the bus messages due this cycle to the FollowMgr
//!         - Run the FollowMgr state report at its configured period
//!         - Archive dispatched paths and supervisor signals
//!
//! The executable exits once the script has ended and no maneuver is running, or the running
//! maneuver has timed out waiting for the leader. A maneuver without a duration otherwise only
//! ends with a `StopManeuver` message.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, trace, warn};
use structopt::StructOpt;

use comms_if::bus::MnvrSignal;
use follow_lib::{
    data_store::{DataStore, PathRecord, SignalRecord},
    follow_mgr::FollowMgr,
    params::FollowExecParams,
};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingMsgs, ScriptInterpreter},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Replay a bus script through the follow maneuver.
#[derive(Debug, StructOpt)]
#[structopt(name = "follow_exec")]
struct Args {
    /// Path to the bus script
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Maneuver parameters, relative to the software root's params directory
    #[structopt(long, default_value = "follow.toml")]
    params: String,

    /// Executable parameters, relative to the software root's params directory
    #[structopt(long, default_value = "follow_exec.toml")]
    exec_params: String,

    /// Increase the log verbosity (-v for debug, -vv for trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("follow_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Formation Follow Executable\n");
    info!("Running on: {}", host::get_hostname());
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let exec_params: FollowExecParams =
        util::params::load(&args.exec_params).wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE SCRIPT ----

    info!("Loading script from {:?}", args.script);

    let mut script =
        ScriptInterpreter::new(&args.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} messages\n",
        script.get_duration(),
        script.get_num_msgs()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let mut follow_mgr =
        FollowMgr::init(&args.params).wrap_err("Failed to initialise FollowMgr")?;
    let report_period_s = follow_mgr.params().state_report_period_s;
    info!("FollowMgr init complete");

    let (mut path_arch, mut signal_arch) = if exec_params.archive {
        (
            Archiver::from_path(&session, "follow/paths.csv")
                .wrap_err("Failed to create the path archive")?,
            Archiver::from_path(&session, "follow/signals.csv")
                .wrap_err("Failed to create the signal archive")?,
        )
    } else {
        (Archiver::default(), Archiver::default())
    };

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let script_start_s = session::get_elapsed_seconds();
    let mut end_of_script = false;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        ds.cycle_start(session::get_elapsed_seconds() - script_start_s);
        let now_s = ds.sim_time_s;

        // ---- BUS MESSAGE PROCESSING ----

        if !end_of_script {
            match script.get_pending(now_s) {
                PendingMsgs::None => (),
                PendingMsgs::Some(msgs) => {
                    for msg in msgs.iter() {
                        match msg.source() {
                            Some(src) => trace!("Delivering message from system {}", src),
                            None => trace!("Delivering {:?}", msg),
                        }

                        let out = follow_mgr.on_bus_msg(msg, now_s);
                        ds.push_output(out);
                    }
                }
                PendingMsgs::EndOfScript => {
                    info!("End of bus script reached, waiting for the maneuver to end");
                    end_of_script = true;
                }
            }
        }

        // ---- STATE REPORT ----

        if ds.report_due(report_period_s) {
            let out = follow_mgr.on_state_report(now_s);
            ds.push_output(out);
        }

        // ---- OUTPUT ----

        for path in ds.paths.iter() {
            debug!(
                "DesiredPath: ({:.7}, {:.7}) rad at {:.2} {:?}",
                path.end_lat_rad, path.end_lon_rad, path.speed, path.speed_units
            );

            if path_arch.is_init() {
                path_arch
                    .serialise(PathRecord::new(now_s, path))
                    .wrap_err("Failed to archive a path")?;
            }
        }

        for signal in ds.signals.iter() {
            match signal {
                MnvrSignal::Progress { .. } => debug!("Signal: {:?}", signal),
                _ => info!("Signal: {:?}", signal),
            }

            if signal_arch.is_init() {
                signal_arch
                    .serialise(SignalRecord::new(now_s, signal))
                    .wrap_err("Failed to archive a signal")?;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;

        // If at the end of the script and no maneuver is running, or the leader is gone, exit
        if end_of_script && follow_mgr.state().is_settled() {
            info!(
                "End of script and the maneuver is {}, exiting",
                follow_mgr.state()
            );
            break;
        }
    }

    info!(
        "{} cycles run, {} paths dispatched",
        ds.num_cycles, ds.num_paths
    );

    Ok(())
}
