//! # Data Store

use comms_if::{
    eqpt::drive::{DriveSensData, TankDems},
    tc::auto::AutoCmd,
};
use log::{info, warn};

use crate::{robot, traj_follow};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    SensDataInvalid,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Safe mode variables
    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Drivetrain
    pub sens_data: DriveSensData,

    /// Demands sent to the drivetrain this cycle, if any.
    pub dems: Option<TankDems>,

    // TrajFollow
    pub traj_follow_status_rpt: traj_follow::StatusReport,

    // Robot
    pub robot_status_rpt: robot::StatusReport,

    // Autonomy
    pub auto_cmd: Option<AutoCmd>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles with invalid sensor data
    pub num_consec_sens_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the robot into safe mode with the given cause.
    ///
    /// Returns true if the robot was not already safe.
    pub fn make_safe(&mut self, cause: SafeModeCause) -> bool {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);
            true
        } else {
            false
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) if root_cause == cause => {
                self.safe = false;
                self.safe_cause = None;
                info!("Make unsafe requested, root cause match, safe mode disabled");
                Ok(())
            }
            Some(root_cause) => {
                warn!(
                    "Make unsafe requested, root cause ({:?}) differs from response ({:?}), \
                    rejected",
                    root_cause,
                    cause
                );
                Err(())
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128).max(1) == 0;

        self.dems = None;
        self.traj_follow_status_rpt = traj_follow::StatusReport::default();
        self.robot_status_rpt = robot::StatusReport::default();
    }

    /// Record whether the cycle finished within its period.
    ///
    /// Returns true once more than `limit` consecutive cycles have overrun.
    pub fn record_cycle_timing(&mut self, overran: bool, limit: u64) -> bool {
        match overran {
            true => self.num_consec_cycle_overruns += 1,
            false => self.num_consec_cycle_overruns = 0,
        }

        self.num_consec_cycle_overruns > limit
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}
