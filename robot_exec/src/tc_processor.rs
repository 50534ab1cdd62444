//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use crate::{
    data_store::{DataStore, SafeModeCause},
    robot::Robot,
    traj_follow::GAIN_NAMES,
};
use comms_if::tc::Tc;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// While the robot is in safe mode only `MakeUnsafe` is executed, all other TCs are rejected.
pub fn exec(ds: &mut DataStore, robot: &mut Robot, tc: &Tc) {
    if ds.safe && *tc != Tc::MakeUnsafe {
        warn!("Robot is in safe mode, {:?} rejected", tc);
        return;
    }

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            if ds.make_safe(SafeModeCause::MakeSafeTc) {
                robot.make_safe();
            }
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::Mode(m) => {
            debug!("Recieved Mode({:?}) command", m);
            robot.set_mode(*m);
        }
        Tc::Tune(t) => {
            if let Err(e) = robot.traj_follower.set_gain(&t.gain, t.value) {
                warn!("Could not tune gain: {} (gains are {:?})", e, GAIN_NAMES);
            }
        }
        Tc::Auto(a) => {
            ds.auto_cmd = Some(a.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
