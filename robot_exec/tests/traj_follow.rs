//! Trajectory following through the robot lifecycle, using mock drivetrain equipment.

use std::{cell::RefCell, rc::Rc};

use approx::assert_relative_eq;
use comms_if::{
    eqpt::drive::{DriveSensData, TankDems},
    tc::{RobotMode, Tc},
};
use robot_lib::{
    auto::{AutoMgr, AutoMgrParams},
    data_store::DataStore,
    hal::{DriveHal, Encoder, Gyro, TankDrive},
    robot::{Robot, RobotParams},
    tc_processor,
    traj::{MotionSegment, Trajectory, TrajectoryStore},
    traj_follow::{ControllerGains, SegmentFollower, TrajFollowParams, TrajFollower},
};
use util::{maths::bound_half_degrees, module::State};

// ------------------------------------------------------------------------------------------------
// MOCK EQUIPMENT
// ------------------------------------------------------------------------------------------------

#[derive(Default)]
struct Equipment {
    left: f64,
    right: f64,
    gyro: f64,
    moves: Vec<(f64, f64)>,
}

type Shared = Rc<RefCell<Equipment>>;

struct LeftEncoder(Shared);
struct RightEncoder(Shared);
struct MockGyro(Shared);
struct MockDrive(Shared);

impl Encoder for LeftEncoder {
    fn get(&self) -> f64 {
        self.0.borrow().left
    }
}

impl Encoder for RightEncoder {
    fn get(&self) -> f64 {
        self.0.borrow().right
    }
}

impl Gyro for MockGyro {
    fn get_angle(&self) -> f64 {
        self.0.borrow().gyro
    }

    fn reset(&mut self) {
        self.0.borrow_mut().gyro = 0.0;
    }
}

impl TankDrive for MockDrive {
    fn move_tank(&mut self, left: f64, right: f64) {
        self.0.borrow_mut().moves.push((left, right));
    }
}

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

fn seg(position: f64, velocity: f64) -> MotionSegment {
    MotionSegment {
        position,
        velocity,
        acceleration: 0.0,
        heading: 0.0,
        dt: 0.02,
    }
}

fn store() -> TrajectoryStore {
    let mut store = TrajectoryStore::new();

    let straight = vec![seg(0.0, 0.0), seg(1.0, 1.0), seg(2.0, 1.0)];
    store.insert(
        "straight",
        Trajectory::new(straight.clone(), straight).unwrap(),
    );

    let long: Vec<_> = (0..20).map(|i| seg(0.1 * i as f64, 1.0)).collect();
    store.insert("long", Trajectory::new(long.clone(), long).unwrap());

    store
}

/// Follower parameters under which one encoder count is one foot.
fn params(gains: ControllerGains) -> TrajFollowParams {
    TrajFollowParams {
        gains,
        encoder_ticks_per_rev: std::f64::consts::PI,
        wheel_diameter_ft: 1.0,
        ..Default::default()
    }
}

fn feed_forward_gains() -> ControllerGains {
    let mut gains = ControllerGains::zero();
    gains.k_v = 1.0;
    gains
}

fn robot(gains: ControllerGains, path: &str) -> (Robot, Shared) {
    let eqpt: Shared = Rc::new(RefCell::new(Equipment::default()));
    let hal = DriveHal {
        left_encoder: Box::new(LeftEncoder(eqpt.clone())),
        right_encoder: Box::new(RightEncoder(eqpt.clone())),
        gyro: Box::new(MockGyro(eqpt.clone())),
        drive: Box::new(MockDrive(eqpt.clone())),
    };

    let robot = Robot::new(
        RobotParams::default(),
        hal,
        TrajFollower::new(params(gains), store()).unwrap(),
        AutoMgr::new(AutoMgrParams {
            default_path: path.to_string(),
        }),
    );

    (robot, eqpt)
}

fn sens(left: f64, right: f64) -> DriveSensData {
    DriveSensData {
        left_count: left,
        right_count: right,
        gyro_angle_deg: 0.0,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn straight_line_end_to_end() {
    let (mut robot, eqpt) = robot(feed_forward_gains(), "straight");
    let mut ds = DataStore::default();

    robot.set_mode(RobotMode::Autonomous);

    let expected = [(0.0, 0.0), (1.0, 1.0), (1.0, 1.0)];

    for (i, (l, r)) in expected.iter().enumerate() {
        {
            let mut e = eqpt.borrow_mut();
            e.left = i as f64;
            e.right = i as f64;
        }

        robot.periodic(&mut ds);

        let dems = ds.dems.unwrap();
        assert_relative_eq!(dems.left, *l, epsilon = 1e-9);
        assert_relative_eq!(dems.right, *r, epsilon = 1e-9);
        assert_relative_eq!(ds.traj_follow_status_rpt.left_error_ft, 0.0, epsilon = 1e-9);
    }

    assert!(!robot.traj_follower.is_following("straight"));

    // Fourth cycle: nothing is followed and the drivetrain is held stopped
    robot.periodic(&mut ds);
    assert!(ds.traj_follow_status_rpt.finished);
    assert_eq!(ds.dems, Some(TankDems::stop()));
    assert_eq!(robot.traj_follower.active(), None);
    assert!(robot.auto_mgr.is_off());
    assert_eq!(eqpt.borrow().moves.len(), 4);
}

#[test]
fn segment_index_is_monotonic() {
    let segs: Vec<_> = (0..7).map(|i| seg(i as f64, 1.0)).collect();
    let gains = ControllerGains::default();

    let mut follower = SegmentFollower::new();
    follower.set_trajectory(segs);

    for i in 0..7 {
        assert_eq!(follower.segment_index(), i);
        assert!(!follower.is_finished());
        follower.calculate(i as f64 * 0.9, &gains);
    }

    for _ in 0..5 {
        assert!(follower.is_finished());
        assert_eq!(follower.calculate(3.0, &gains), 0.0);
        assert_eq!(follower.segment_index(), 7);
    }
}

#[test]
fn zero_gains_give_zero_demand() {
    let mut tf = TrajFollower::new(params(ControllerGains::zero()), store()).unwrap();
    tf.follow_trajectory("long", &sens(0.0, 0.0));

    let readings = [0.0, -3.5, 1e6, 0.25, -1e-3, 42.0];
    for r in readings.iter() {
        let (dems, _) = tf.proc(&sens(*r, -*r)).unwrap();
        assert_eq!(dems, Some(TankDems::new(0.0, 0.0)));
    }
}

#[test]
fn heading_error_is_bounded() {
    let angles = [-1080.0, -540.0, -180.0, -179.5, 0.0, 179.5, 180.0, 359.0, 540.0, 1e5];

    for a in angles.iter() {
        let b = bound_half_degrees(*a);
        assert!(b > -180.0 && b <= 180.0, "{} bound to {}", a, b);

        for k in -3..=3 {
            let shifted = bound_half_degrees(*a + 360.0 * k as f64);
            assert_relative_eq!(shifted, b, epsilon = 1e-6);
        }
    }
}

/// Sides of unequal length can only be driven through `SegmentFollower` directly, since
/// `Trajectory::new` rejects them and so `TrajFollower` never holds one. The follower level
/// check therefore uses an equal length trajectory and checks that both sides have finished.
#[test]
fn completion_requires_both_sides() {
    let left: Vec<_> = (0..5).map(|i| seg(i as f64, 1.0)).collect();
    let right: Vec<_> = (0..7).map(|i| seg(i as f64, 1.0)).collect();

    let gains = ControllerGains::default();
    let mut l = SegmentFollower::new();
    let mut r = SegmentFollower::new();
    l.set_trajectory(left.clone());
    r.set_trajectory(right.clone());

    for i in 0..7 {
        l.calculate(0.0, &gains);
        r.calculate(0.0, &gains);
        assert_eq!(l.is_finished(), i >= 4);
        assert_eq!(r.is_finished(), i == 6);
    }

    // Stored trajectories always have sides of equal length
    assert!(Trajectory::new(left, right).is_err());

    // The active trajectory is only done once both sides have finished
    let mut tf = TrajFollower::new(params(ControllerGains::default()), store()).unwrap();
    tf.follow_trajectory("straight", &sens(0.0, 0.0));
    for _ in 0..3 {
        assert!(tf.is_following("straight"));
        tf.proc(&sens(0.0, 0.0)).unwrap();
    }
    assert!(tf.left().is_finished() && tf.right().is_finished());
    assert!(!tf.is_following("straight"));
}

#[test]
fn unknown_trajectory_is_ignored() {
    let mut tf = TrajFollower::new(params(ControllerGains::default()), store()).unwrap();

    tf.follow_trajectory("long", &sens(0.0, 0.0));
    tf.proc(&sens(0.05, 0.02)).unwrap();
    tf.proc(&sens(0.15, 0.12)).unwrap();

    let before = (
        tf.active().map(String::from),
        tf.left().segment_index(),
        tf.left().last_error(),
        tf.right().segment_index(),
        tf.right().last_error(),
    );

    assert!(!tf.follow_trajectory("nonexistent", &sens(9.0, 9.0)));

    let after = (
        tf.active().map(String::from),
        tf.left().segment_index(),
        tf.left().last_error(),
        tf.right().segment_index(),
        tf.right().last_error(),
    );

    assert_eq!(before, after);
}

#[test]
fn restarting_resets_followers() {
    let mut tf = TrajFollower::new(params(ControllerGains::default()), store()).unwrap();

    tf.follow_trajectory("long", &sens(0.0, 0.0));
    for i in 0..8 {
        tf.proc(&sens(0.05 * i as f64, 0.0)).unwrap();
    }
    assert_eq!(tf.left().segment_index(), 8);
    assert!(tf.right().last_error() != 0.0);

    tf.follow_trajectory("long", &sens(0.35, 0.0));
    assert_eq!(tf.left().segment_index(), 0);
    assert_eq!(tf.right().segment_index(), 0);
    assert_eq!(tf.left().last_error(), 0.0);
    assert_eq!(tf.right().last_error(), 0.0);
    assert!(tf.is_following("long"));
}

#[test]
fn scripted_match() {
    let (mut robot, eqpt) = robot(feed_forward_gains(), "straight");
    let mut ds = DataStore::default();

    let mut script = util::script_interpreter::ScriptInterpreter::from_str(
        r#"0.0: {"type": "AUTO", "payload": {"Select": {"path": "long"}}};
        0.03: {"type": "MODE", "payload": "Autonomous"};
        0.05: {"type": "AUTO", "payload": "Abort"};
        0.07: {"type": "MODE", "payload": "Disabled"};"#,
    )
    .unwrap();

    let mut time_s = 0.0;
    loop {
        time_s += 0.02;
        match script.get_pending_tcs_at(time_s) {
            util::script_interpreter::PendingTcs::Some(tcs) => {
                for tc in tcs.iter() {
                    tc_processor::exec(&mut ds, &mut robot, tc);
                }
            }
            util::script_interpreter::PendingTcs::None => (),
            util::script_interpreter::PendingTcs::EndOfScript => break,
        }

        robot.periodic(&mut ds);

        // Abort arrives at 0.05 s and is processed in the next cycle
        if (time_s - 0.06).abs() < 1e-9 {
            assert!(robot.auto_mgr.is_off());
            assert_eq!(robot.traj_follower.active(), None);
        }
    }

    assert_eq!(robot.auto_mgr.selected_path(), "long");
    assert_eq!(robot.mode(), RobotMode::Disabled);
    assert_eq!(eqpt.borrow().moves.last(), Some(&(0.0, 0.0)));

    // Safe mode holds the drivetrain stopped
    tc_processor::exec(&mut ds, &mut robot, &Tc::MakeSafe);
    robot.periodic(&mut ds);
    assert_eq!(ds.dems, Some(TankDems::stop()));
}
