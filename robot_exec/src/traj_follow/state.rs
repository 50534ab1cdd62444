//! Trajectory follower module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::traj::{StoreError, TrajectoryStore};
use comms_if::eqpt::drive::{DriveSensData, TankDems};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::r2d,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows named trajectories from the store, one at a time.
#[derive(Default)]
pub struct TrajFollower {
    params: TrajFollowParams,

    /// Trajectories available to follow.
    store: TrajectoryStore,

    /// Name of the trajectory being followed.
    active: Option<String>,

    left: SegmentFollower,
    right: SegmentFollower,
    heading: HeadingCorrector,

    report: StatusReport,
    arch_report: Archiver,
}

/// The status report containing the tracking errors and demands of the cycle.
#[derive(Debug, Default, Copy, Clone, Serialize, PartialEq)]
pub struct StatusReport {
    /// True if a trajectory was being followed this cycle.
    pub following: bool,

    /// Index of the segment each side will calculate next.
    pub left_segment_index: usize,
    pub right_segment_index: usize,

    /// Distance error of each side this cycle.
    ///
    /// Units: feet
    pub left_error_ft: f64,
    pub right_error_ft: f64,

    /// Planned heading, counter-clockwise positive.
    ///
    /// Units: degrees
    pub planned_heading_deg: f64,

    /// Measured heading after applying the gyro convention.
    ///
    /// Units: degrees
    pub measured_heading_deg: f64,

    /// Bounded heading error.
    ///
    /// Units: degrees
    pub heading_error_deg: f64,

    /// Differential trim applied to the sides.
    pub heading_trim: f64,

    /// Demands output this cycle.
    pub left_dem: f64,
    pub right_dem: f64,

    /// Set on the cycle the trajectory completed.
    pub finished: bool,

    /// Set if the distance error limit was exceeded and the trajectory
    /// abandoned.
    pub error_limit_exceeded: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajFollowError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(InvalidParamsError),

    #[error("Could not load the trajectory store: {0}")]
    StoreLoadError(StoreError),

    #[error("Could not initialise the archives: {0}")]
    ArchiveError(ArchiveError),

    /// The sensor data contains a NaN or infinite value. The cycle is skipped
    /// without advancing the followers.
    #[error("Sensor data is not finite: {0:?}")]
    NonFiniteSensData(DriveSensData),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TrajFollower {
    type InitData = &'static str;
    type InitError = TrajFollowError;

    type InputData = DriveSensData;
    type OutputData = Option<TankDems>;
    type StatusReport = StatusReport;
    type ProcError = TrajFollowError;

    /// Initialise the TrajFollower module.
    ///
    /// Expected init data is the path to the parameter file. The trajectory
    /// store is loaded from the file given in the parameters.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(TrajFollowError::ParamLoadError)?;
        self.params.validate().map_err(TrajFollowError::InvalidParams)?;

        let mut store_path = util::host::get_sw_root()
            .map_err(|_| TrajFollowError::ParamLoadError(params::LoadError::SwRootNotSet))?;
        store_path.push(&self.params.store_file);

        self.store = TrajectoryStore::load(store_path).map_err(TrajFollowError::StoreLoadError)?;

        self.arch_report = Archiver::from_path(session, "traj_follow/status_report.csv")
            .map_err(TrajFollowError::ArchiveError)?;

        self.reset();

        Ok(())
    }

    /// Perform one cycle of trajectory following.
    ///
    /// Returns the tank demands for this cycle, or `None` if no trajectory is
    /// being followed, in which case the drivetrain is left to the caller.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let name = match self.active {
            Some(ref n) => n.clone(),
            None => return Ok((None, self.report)),
        };

        // Both sides must be done before the trajectory is cleared
        if self.left.is_finished() && self.right.is_finished() {
            info!("Trajectory {:?} complete", name);
            self.active = None;
            self.report.finished = true;
            return Ok((None, self.report));
        }

        if !(input_data.left_count.is_finite()
            && input_data.right_count.is_finite()
            && input_data.gyro_angle_deg.is_finite())
        {
            return Err(TrajFollowError::NonFiniteSensData(*input_data));
        }

        let gains = self.params.gains;

        // ---- LONGITUDINAL ----

        let left = self.left.calculate(input_data.left_count, &gains);
        let right = self.right.calculate(input_data.right_count, &gains);

        // ---- HEADING ----

        let planned_heading_deg = r2d(self.left.heading());
        let measured_heading_deg = match self.params.invert_gyro {
            true => -input_data.gyro_angle_deg,
            false => input_data.gyro_angle_deg,
        };

        let trim = self.heading.correct(measured_heading_deg, planned_heading_deg, &gains);

        debug!(
            "Heading: planned {:.3} - measured {:.3} = {:.3}, trim {:.4}",
            planned_heading_deg,
            measured_heading_deg,
            self.heading.last_error_deg(),
            trim
        );

        let dems = TankDems::new(left - trim, right + trim);

        debug!("Drive: {:.4} {:.4}", dems.left, dems.right);

        self.report = StatusReport {
            following: true,
            left_segment_index: self.left.segment_index(),
            right_segment_index: self.right.segment_index(),
            left_error_ft: self.left.last_error(),
            right_error_ft: self.right.last_error(),
            planned_heading_deg,
            measured_heading_deg,
            heading_error_deg: self.heading.last_error_deg(),
            heading_trim: trim,
            left_dem: dems.left,
            right_dem: dems.right,
            finished: false,
            error_limit_exceeded: false,
        };

        // ---- ERROR LIMITS ----

        if let Some(limit) = self.params.max_distance_error_ft {
            if self.left.last_error().abs() > limit || self.right.last_error().abs() > limit {
                error!(
                    "Distance error limit ({} ft) exceeded following {:?} \
                    (left {:.3} ft, right {:.3} ft), abandoning trajectory",
                    limit,
                    name,
                    self.left.last_error(),
                    self.right.last_error()
                );
                self.active = None;
                self.report.error_limit_exceeded = true;
                return Ok((None, self.report));
            }
        }

        Ok((Some(dems), self.report))
    }
}

impl Archived for TrajFollower {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl TrajFollower {
    /// Create a new follower from parameters and a loaded store.
    pub fn new(params: TrajFollowParams, store: TrajectoryStore) -> Result<Self, TrajFollowError> {
        params.validate().map_err(TrajFollowError::InvalidParams)?;

        let mut follower = Self {
            params,
            store,
            ..Default::default()
        };
        follower.reset();
        Ok(follower)
    }

    /// Return the follower to its initial state, dropping any trajectory.
    ///
    /// Called when the robot is enabled.
    pub fn reset(&mut self) {
        self.active = None;
        self.left = SegmentFollower::new();
        self.right = SegmentFollower::new();
        self.heading.reset();
        self.report = StatusReport::default();
    }

    /// Begin following the named trajectory.
    ///
    /// The encoder readings in `sens_data` become the zero reference of the
    /// trajectory. Any trajectory already being followed is replaced. If the
    /// store has no trajectory with this name nothing changes and `false` is
    /// returned.
    pub fn follow_trajectory(&mut self, name: &str, sens_data: &DriveSensData) -> bool {
        let traj = match self.store.get(name) {
            Some(t) => t,
            None => {
                warn!("No trajectory called {:?} in the store, ignoring", name);
                return false;
            }
        };

        info!(
            "Following trajectory: {:?} ({} segments, {:.2} s)",
            name,
            traj.len(),
            traj.duration_s()
        );

        if let Some(ref prev) = self.active {
            if !(self.left.is_finished() && self.right.is_finished()) {
                warn!("Trajectory {:?} replaced before it completed", prev);
            }
        }

        let ticks = self.params.encoder_ticks_per_rev;
        let circumference = self.params.wheel_circumference_ft();

        self.left.configure(sens_data.left_count, ticks, circumference);
        self.right.configure(sens_data.right_count, ticks, circumference);

        self.left.set_trajectory(traj.left().to_vec());
        self.right.set_trajectory(traj.right().to_vec());

        self.active = Some(name.to_string());

        true
    }

    /// Returns true if the named trajectory is being followed and has not yet
    /// finished.
    pub fn is_following(&self, name: &str) -> bool {
        match self.active {
            Some(ref n) => n == name && !(self.left.is_finished() && self.right.is_finished()),
            None => false,
        }
    }

    /// Name of the trajectory being followed, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Abandon the current trajectory.
    pub fn stop(&mut self) {
        if let Some(name) = self.active.take() {
            info!("Trajectory {:?} stopped", name);
        }
    }

    pub fn gains(&self) -> &ControllerGains {
        &self.params.gains
    }

    /// Set a controller gain by name. The new value is used from the next
    /// cycle.
    pub fn set_gain(&mut self, name: &str, value: f64) -> Result<f64, GainError> {
        let prev = self.params.gains.set(name, value)?;
        info!("Gain {} changed from {} to {}", name, prev, value);
        Ok(prev)
    }

    pub fn store(&self) -> &TrajectoryStore {
        &self.store
    }

    pub fn left(&self) -> &SegmentFollower {
        &self.left
    }

    pub fn right(&self) -> &SegmentFollower {
        &self.right
    }

    pub fn heading_corrector(&self) -> &HeadingCorrector {
        &self.heading
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::{MotionSegment, Trajectory};
    use approx::assert_relative_eq;

    fn seg(position: f64, velocity: f64, heading: f64) -> MotionSegment {
        MotionSegment {
            position,
            velocity,
            acceleration: 0.0,
            heading,
            dt: 0.02,
        }
    }

    fn straight(len: usize) -> Vec<MotionSegment> {
        (0..len).map(|i| seg(i as f64, 1.0, 0.0)).collect()
    }

    /// Parameters under which one encoder count is one foot.
    fn unit_params(gains: ControllerGains) -> TrajFollowParams {
        TrajFollowParams {
            gains,
            encoder_ticks_per_rev: std::f64::consts::PI,
            wheel_diameter_ft: 1.0,
            invert_gyro: true,
            ..Default::default()
        }
    }

    fn follower(gains: ControllerGains) -> TrajFollower {
        let mut store = TrajectoryStore::new();
        store.insert(
            "straight",
            Trajectory::new(
                vec![seg(0.0, 0.0, 0.0), seg(1.0, 1.0, 0.0), seg(2.0, 1.0, 0.0)],
                vec![seg(0.0, 0.0, 0.0), seg(1.0, 1.0, 0.0), seg(2.0, 1.0, 0.0)],
            )
            .unwrap(),
        );
        store.insert("long", Trajectory::new(straight(10), straight(10)).unwrap());
        store.insert(
            "turn",
            Trajectory::new(
                vec![seg(0.0, 0.0, std::f64::consts::FRAC_PI_2); 4],
                vec![seg(0.0, 0.0, std::f64::consts::FRAC_PI_2); 4],
            )
            .unwrap(),
        );

        TrajFollower::new(unit_params(gains), store).unwrap()
    }

    fn sens(left: f64, right: f64, gyro: f64) -> DriveSensData {
        DriveSensData {
            left_count: left,
            right_count: right,
            gyro_angle_deg: gyro,
        }
    }

    #[test]
    fn test_straight_feed_forward() {
        let mut gains = ControllerGains::zero();
        gains.k_v = 1.0;
        let mut tf = follower(gains);

        assert!(tf.follow_trajectory("straight", &sens(0.0, 0.0, 0.0)));
        assert!(tf.is_following("straight"));

        let expected = [0.0, 1.0, 1.0];
        for (i, e) in expected.iter().enumerate() {
            let pos = i as f64;
            let (dems, report) = tf.proc(&sens(pos, pos, 0.0)).unwrap();
            let dems = dems.unwrap();
            assert_relative_eq!(dems.left, *e, epsilon = 1e-9);
            assert_relative_eq!(dems.right, *e, epsilon = 1e-9);
            assert_relative_eq!(report.left_error_ft, 0.0, epsilon = 1e-9);
        }

        assert!(!tf.is_following("straight"));
        assert_eq!(tf.active(), Some("straight"));

        let (dems, report) = tf.proc(&sens(2.0, 2.0, 0.0)).unwrap();
        assert_eq!(dems, None);
        assert!(report.finished);
        assert_eq!(tf.active(), None);
    }

    #[test]
    fn test_rejects_zero_ticks() {
        let params = TrajFollowParams {
            encoder_ticks_per_rev: 0.0,
            ..unit_params(ControllerGains::default())
        };

        assert!(matches!(
            TrajFollower::new(params, TrajectoryStore::new()),
            Err(TrajFollowError::InvalidParams(InvalidParamsError::EncoderTicksPerRev(_)))
        ));
    }

    #[test]
    fn test_no_trajectory() {
        let mut tf = follower(ControllerGains::default());
        let (dems, report) = tf.proc(&sens(1.0, 1.0, 0.0)).unwrap();
        assert_eq!(dems, None);
        assert!(!report.following);
        assert!(!tf.is_following("straight"));
    }

    #[test]
    fn test_unknown_trajectory() {
        let mut tf = follower(ControllerGains::default());

        assert!(!tf.follow_trajectory("nonexistent", &sens(0.0, 0.0, 0.0)));
        assert_eq!(tf.active(), None);

        tf.follow_trajectory("long", &sens(0.0, 0.0, 0.0));
        tf.proc(&sens(0.3, 0.2, 0.0)).unwrap();
        tf.proc(&sens(1.1, 0.9, 0.0)).unwrap();

        let left = tf.left().clone();
        let right = tf.right().clone();

        assert!(!tf.follow_trajectory("nonexistent", &sens(5.0, 5.0, 0.0)));
        assert_eq!(tf.active(), Some("long"));
        assert_eq!(tf.left().segment_index(), left.segment_index());
        assert_eq!(tf.left().last_error(), left.last_error());
        assert_eq!(tf.right().segment_index(), right.segment_index());
        assert_eq!(tf.right().last_error(), right.last_error());
    }

    #[test]
    fn test_restart_resets_state() {
        let mut tf = follower(ControllerGains::default());

        tf.follow_trajectory("long", &sens(0.0, 0.0, 0.0));
        for _ in 0..4 {
            tf.proc(&sens(0.5, 0.25, 3.0)).unwrap();
        }
        assert_eq!(tf.left().segment_index(), 4);
        assert!(tf.left().last_error() != 0.0);

        assert!(tf.follow_trajectory("long", &sens(0.5, 0.25, 3.0)));
        assert_eq!(tf.left().segment_index(), 0);
        assert_eq!(tf.right().segment_index(), 0);
        assert_eq!(tf.left().last_error(), 0.0);
        assert_eq!(tf.right().last_error(), 0.0);

        // The encoders are zeroed at the new start
        assert_relative_eq!(tf.left().distance_covered(0.5), 0.0);
        assert!(tf.is_following("long"));
    }

    #[test]
    fn test_replace_active() {
        let mut tf = follower(ControllerGains::default());
        tf.follow_trajectory("long", &sens(0.0, 0.0, 0.0));
        tf.proc(&sens(0.0, 0.0, 0.0)).unwrap();

        tf.follow_trajectory("straight", &sens(0.0, 0.0, 0.0));
        assert!(!tf.is_following("long"));
        assert!(tf.is_following("straight"));
    }

    #[test]
    fn test_heading_trim() {
        let mut gains = ControllerGains::zero();
        gains.head_k_p = 0.01;
        let mut tf = follower(gains);

        tf.follow_trajectory("turn", &sens(0.0, 0.0, 0.0));

        // Planned 90 deg counter-clockwise, gyro reads 0, so turn left
        let (dems, report) = tf.proc(&sens(0.0, 0.0, 0.0)).unwrap();
        let dems = dems.unwrap();
        assert_relative_eq!(report.planned_heading_deg, 90.0, epsilon = 1e-9);
        assert_relative_eq!(report.heading_trim, 0.9, epsilon = 1e-9);
        assert_relative_eq!(dems.left, -0.9, epsilon = 1e-9);
        assert_relative_eq!(dems.right, 0.9, epsilon = 1e-9);

        // Clockwise positive gyro reading -90 is on the planned heading
        let (dems, report) = tf.proc(&sens(0.0, 0.0, -90.0)).unwrap();
        let dems = dems.unwrap();
        assert_relative_eq!(report.measured_heading_deg, 90.0, epsilon = 1e-9);
        assert_relative_eq!(dems.left, 0.0, epsilon = 1e-9);
        assert_relative_eq!(dems.right, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_inverted_gyro() {
        let mut gains = ControllerGains::zero();
        gains.head_k_p = 1.0;
        let mut tf = follower(gains);
        tf.params.invert_gyro = false;

        tf.follow_trajectory("turn", &sens(0.0, 0.0, 0.0));
        let (_, report) = tf.proc(&sens(0.0, 0.0, 80.0)).unwrap();
        assert_relative_eq!(report.measured_heading_deg, 80.0);
        assert_relative_eq!(report.heading_error_deg, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_sens_data() {
        let mut tf = follower(ControllerGains::default());
        tf.follow_trajectory("long", &sens(0.0, 0.0, 0.0));

        match tf.proc(&sens(std::f64::NAN, 0.0, 0.0)) {
            Err(TrajFollowError::NonFiniteSensData(_)) => (),
            r => panic!("Expected NonFiniteSensData, got {:?}", r.map(|r| r.0)),
        }

        // Followers not advanced
        assert_eq!(tf.left().segment_index(), 0);
        assert!(tf.is_following("long"));
    }

    #[test]
    fn test_error_limit() {
        let mut tf = follower(ControllerGains::default());
        tf.params.max_distance_error_ft = Some(1.0);

        tf.follow_trajectory("long", &sens(0.0, 0.0, 0.0));

        // Within the limit
        let (dems, _) = tf.proc(&sens(0.5, 0.0, 0.0)).unwrap();
        assert!(dems.is_some());

        // Left has not moved but should be at 1 ft, right is 1.5 ft behind
        let (dems, report) = tf.proc(&sens(0.0, -0.5, 0.0)).unwrap();
        assert_eq!(dems, None);
        assert!(report.error_limit_exceeded);
        assert_eq!(tf.active(), None);
    }

    #[test]
    fn test_set_gain() {
        let mut tf = follower(ControllerGains::zero());
        tf.follow_trajectory("straight", &sens(0.0, 0.0, 0.0));

        let (dems, _) = tf.proc(&sens(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(dems.unwrap().left, 0.0);

        assert_eq!(tf.set_gain("k_v", 2.0), Ok(0.0));
        assert!(tf.set_gain("k_q", 2.0).is_err());

        let (dems, _) = tf.proc(&sens(1.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(dems.unwrap().left, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut tf = follower(ControllerGains::default());
        tf.follow_trajectory("long", &sens(0.0, 0.0, 0.0));
        tf.proc(&sens(0.0, 0.0, 45.0)).unwrap();

        tf.reset();
        assert_eq!(tf.active(), None);
        assert_eq!(tf.heading_corrector().last_error_deg(), 0.0);
        assert!(!tf.left().has_trajectory());
    }
}
