//! # Plan Builder
//!
//! Builds the requests which send a leader along a route. The route is read from a TOML file of
//! waypoints in degrees, and the plan database and plan start requests are printed as JSON, one
//! per line, ready to be put on the bus.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use chrono::Utc;
use color_eyre::{eyre::WrapErr, Result};
use structopt::StructOpt;

use follow_lib::plan::{self, Route};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Build the plan requests for a route.
#[derive(Debug, StructOpt)]
#[structopt(name = "plan_builder")]
struct Args {
    /// Path to the route file
    #[structopt(parse(from_os_str))]
    route: PathBuf,

    /// Override the plan id given in the route file
    #[structopt(long)]
    plan_id: Option<String>,

    /// Give the plan a unique id based on the current time
    #[structopt(long, conflicts_with = "plan-id")]
    timestamped: bool,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::from_args();

    let route: Route =
        util::params::load_from_path(&args.route).wrap_err("Could not load the route")?;

    let plan_id = match (args.plan_id, args.timestamped) {
        (Some(id), _) => id,
        (None, true) => format!("{}_{}", route.plan_id, Utc::now().format("%Y%m%d_%H%M%S")),
        (None, false) => route.plan_id.clone(),
    };

    let mut db = plan::plan_db_entry(&route.waypoints(), &plan_id, route.speed)
        .wrap_err("Could not build the plan")?;
    db.destination = route.destination;

    let ctrl = plan::start_request(&plan_id, route.destination);

    println!(
        "{}",
        serde_json::to_string(&db).wrap_err("Could not serialise the plan")?
    );
    println!(
        "{}",
        serde_json::to_string(&ctrl).wrap_err("Could not serialise the start request")?
    );

    Ok(())
}
