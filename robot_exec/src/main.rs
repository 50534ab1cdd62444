//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Robot processing:
//!             - Drivetrain sensing
//!             - Autonomy processing
//!             - Trajectory following
//!             - Drivetrain demands
//!         - Archiving
//!
//! TCs are taken from the script given as the only argument. Without a script the default match
//! sequence is run: autonomous for the length of the autonomous period, then disabled.
//!
//! # Modules
//!
//! All cyclic modules (e.g. `traj_follow`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::tc::RobotMode;
use robot_lib::{
    data_store::DataStore,
    hal::dry_run,
    robot::{Robot, RobotParams},
    tc_processor,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Length of the autonomous period of a match.
const AUTONOMOUS_PERIOD_S: f64 = 15.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("robot_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    // The follower's per-cycle values are archived, so its debug output is left out of the log
    logger_init(
        LevelFilter::Debug,
        &[("robot_lib::traj_follow", LevelFilter::Info)],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let robot_params: RobotParams =
        util::params::load("robot.toml").wrap_err("Could not load robot params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut script = match args.len() {
        // If we have a single argument use it as the script path
        2 => {
            info!("Loading script from \"{}\"", &args[1]);
            ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?
        }
        1 => {
            info!("No script provided, running the default match sequence");
            ScriptInterpreter::from_str(&format!(
                "0.0: {{\"type\": \"MODE\", \"payload\": \"Autonomous\"}};\n\
                {:.1}: {{\"type\": \"MODE\", \"payload\": \"Disabled\"}};\n",
                AUTONOMOUS_PERIOD_S
            ))
            .wrap_err("Failed to build the default sequence")?
        }
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // No hardware drivetrain is available to the executable, so the dry run one is used
    let (hal, _) = dry_run::new_hal(robot_params.dry_run);

    let mut robot = Robot::init(robot_params, hal, &session)
        .wrap_err("Failed to initialise the robot")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, &mut robot, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // ---- ROBOT PROCESSING ----

        robot.periodic(&mut ds);

        if ds.is_1_hz_cycle {
            let rpt = &ds.traj_follow_status_rpt;
            info!(
                "{:?}, safe: {}, following: {}, errors: ({:.3}, {:.3}) ft, heading error: {:.2} deg",
                robot.mode(),
                ds.safe,
                rpt.following,
                rpt.left_error_ft,
                rpt.right_error_ft,
                rpt.heading_error_deg
            );
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = robot.write() {
            warn!("Could not write archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        let sleep_dur = Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur);

        match sleep_dur {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }

        if ds.record_cycle_timing(sleep_dur.is_none(), robot.params.max_consec_cycle_overruns) {
            robot.set_mode(RobotMode::Disabled);
            return Err(eyre!(
                "More than {} consecutive cycle overruns",
                robot.params.max_consec_cycle_overruns
            ));
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    robot.set_mode(RobotMode::Disabled);

    info!("End of execution");

    Ok(())
}
