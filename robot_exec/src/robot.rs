//! # Robot lifecycle
//!
//! [`Robot`] owns the drivetrain HAL and the control modules, and is driven by the executive
//! through the mode lifecycle:
//!
//! - [`Robot::on_enable`] when entering Autonomous or Teleop,
//! - [`Robot::periodic`] once per cycle in every mode,
//! - [`Robot::on_disable`] when entering Disabled.
//!
//! Each cycle the drivetrain sensors are read, the autonomy manager is stepped, the trajectory
//! follower is processed, and the resulting demands are saturated and sent to the drivetrain. In
//! safe mode only the sensors are read and the drivetrain is held stopped.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{eqpt::drive::TankDems, tc::RobotMode};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    auto::{AutoMgr, AutoMgrError, StepContext},
    data_store::{DataStore, SafeModeCause},
    hal::{dry_run::DryRunParams, DriveHal},
    traj_follow::{TrajFollowError, TrajFollower},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RobotParams {
    /// Limit applied to both sides' demands before they are sent to the drivetrain.
    pub max_demand: f64,

    /// Number of consecutive cycles of invalid sensor data after which the robot is made safe.
    pub max_consec_sens_errors: u64,

    /// Number of consecutive cycle overruns after which the executive stops.
    pub max_consec_cycle_overruns: u64,

    /// Geometry of the drivetrain used when running without hardware.
    pub dry_run: DryRunParams,
}

pub struct Robot {
    pub params: RobotParams,

    hal: DriveHal,

    pub traj_follower: TrajFollower,

    pub auto_mgr: AutoMgr,

    mode: RobotMode,

    report: StatusReport,

    arch_report: Archiver,
}

#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq)]
pub struct StatusReport {
    /// Session time of the cycle.
    pub time_s: f64,

    pub autonomous: bool,
    pub safe: bool,
    pub auto_on: bool,

    /// True if demands were sent to the drivetrain this cycle.
    pub dems_sent: bool,
    pub left_dem: f64,
    pub right_dem: f64,

    /// True if either demand was limited by `max_demand`.
    pub dems_saturated: bool,

    /// True if the sensor data could not be used this cycle.
    pub sens_invalid: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Failed to initialise TrajFollow: {0}")]
    TrajFollowInitError(TrajFollowError),

    #[error("Failed to initialise AutoMgr: {0}")]
    AutoMgrInitError(AutoMgrError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveError(ArchiveError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RobotParams {
    fn default() -> Self {
        Self {
            max_demand: 1.0,
            max_consec_sens_errors: 5,
            max_consec_cycle_overruns: 500,
            dry_run: DryRunParams::default(),
        }
    }
}

impl Robot {
    /// Initialise the modules from their parameter files, using the given drivetrain.
    pub fn init(params: RobotParams, hal: DriveHal, session: &Session) -> Result<Self, RobotError> {
        let mut traj_follower = TrajFollower::default();
        traj_follower
            .init("traj_follow.toml", session)
            .map_err(RobotError::TrajFollowInitError)?;
        info!(
            "TrajFollow init complete, {} trajectories available",
            traj_follower.store().len()
        );

        let auto_mgr = AutoMgr::init("auto_mgr.toml").map_err(RobotError::AutoMgrInitError)?;
        info!("AutoMgr init complete");

        let mut robot = Self::new(params, hal, traj_follower, auto_mgr);
        robot.arch_report = Archiver::from_path(session, "robot/status_report.csv")
            .map_err(RobotError::ArchiveError)?;

        Ok(robot)
    }

    /// Build a robot from already initialised modules. The robot starts disabled.
    pub fn new(
        params: RobotParams,
        hal: DriveHal,
        traj_follower: TrajFollower,
        auto_mgr: AutoMgr,
    ) -> Self {
        Self {
            params,
            hal,
            traj_follower,
            auto_mgr,
            mode: RobotMode::Disabled,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    /// Change to the given mode, running the enable or disable actions.
    ///
    /// Requesting the current mode does nothing.
    pub fn set_mode(&mut self, mode: RobotMode) {
        if mode == self.mode {
            return;
        }

        match mode {
            RobotMode::Disabled => self.on_disable(),
            m => self.on_enable(m),
        }
    }

    /// Enter an enabled mode.
    ///
    /// The trajectory follower is reset, and the autonomous routine is started if entering
    /// Autonomous.
    pub fn on_enable(&mut self, mode: RobotMode) {
        info!("Robot enabled in {:?}", mode);

        self.mode = mode;
        self.traj_follower.reset();

        match mode {
            RobotMode::Autonomous => self.auto_mgr.start(),
            _ => self.auto_mgr.stop(),
        }
    }

    /// Enter Disabled mode.
    ///
    /// Stops the autonomous routine and the drivetrain, and zeros the gyro.
    pub fn on_disable(&mut self) {
        info!("Robot disabled");

        self.mode = RobotMode::Disabled;
        self.auto_mgr.stop();
        self.traj_follower.stop();
        self.hal.send_dems(&TankDems::stop());
        self.hal.reset_gyro();
    }

    /// Stop everything ahead of safe mode.
    pub fn make_safe(&mut self) {
        self.auto_mgr.stop();
        self.traj_follower.stop();
        self.hal.send_dems(&TankDems::stop());
    }

    /// Execute one cycle.
    pub fn periodic(&mut self, ds: &mut DataStore) {
        self.report = StatusReport {
            time_s: util::session::get_elapsed_seconds(),
            autonomous: self.mode == RobotMode::Autonomous,
            ..Default::default()
        };

        // ---- DATA INPUT ----

        ds.sens_data = self.hal.read_sens();

        let sens_valid = ds.sens_data.left_count.is_finite()
            && ds.sens_data.right_count.is_finite()
            && ds.sens_data.gyro_angle_deg.is_finite();

        if sens_valid {
            ds.num_consec_sens_errors = 0;

            // Only a sensor data safe mode is cleared by valid data
            if ds.safe_cause == Some(SafeModeCause::SensDataInvalid)
                && ds.make_unsafe(SafeModeCause::SensDataInvalid).is_ok()
            {
                info!("Sensor data valid again");
            }
        } else {
            ds.num_consec_sens_errors += 1;
            self.report.sens_invalid = true;

            if ds.num_consec_sens_errors >= self.params.max_consec_sens_errors
                && ds.make_safe(SafeModeCause::SensDataInvalid)
            {
                self.make_safe();
            }
        }

        // ---- SAFE MODE ----

        if ds.safe {
            let dems = TankDems::stop();
            self.hal.send_dems(&dems);
            self.record_dems(ds, dems);
            ds.auto_cmd = None;
            self.report.safe = true;
            ds.robot_status_rpt = self.report;
            return;
        }

        // ---- AUTONOMY PROCESSING ----

        self.auto_mgr.step(
            ds.auto_cmd.take(),
            &mut StepContext {
                traj_follower: &mut self.traj_follower,
                sens_data: &ds.sens_data,
            },
        );
        self.report.auto_on = self.auto_mgr.is_on();

        // ---- TRAJECTORY FOLLOWING ----

        let traj_dems = match self.traj_follower.proc(&ds.sens_data) {
            Ok((o, r)) => {
                ds.traj_follow_status_rpt = r;
                o
            }
            Err(e) => {
                warn!("Error during TrajFollow processing: {}", e);
                Some(TankDems::stop())
            }
        };

        // ---- DRIVETRAIN OUTPUT ----

        // In autonomous the drivetrain is held stopped when nothing is being followed
        let dems = match (traj_dems, self.mode) {
            (Some(d), _) => Some(d),
            (None, RobotMode::Autonomous) => Some(TankDems::stop()),
            (None, _) => None,
        };

        if let Some(mut d) = dems {
            if d.saturate(self.params.max_demand) {
                self.report.dems_saturated = true;
            }
            self.hal.send_dems(&d);
            self.record_dems(ds, d);
        }

        ds.robot_status_rpt = self.report;
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    fn record_dems(&mut self, ds: &mut DataStore, dems: TankDems) {
        self.report.dems_sent = true;
        self.report.left_dem = dems.left;
        self.report.right_dem = dems.right;
        ds.dems = Some(dems);
    }
}

impl Archived for Robot {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;
        self.traj_follower.write()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
