//! # Hardware abstraction
//!
//! The drivetrain equipment is reached through the traits in this module, so that the robot can
//! be run against real hardware, the [`dry_run`] drivetrain, or mocks in tests. Handles are
//! injected into [`DriveHal`] when the robot is constructed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::{DriveSensData, TankDems};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A wheel encoder.
pub trait Encoder {
    /// Cumulative count since power on.
    fn get(&self) -> f64;
}

/// A heading gyro.
pub trait Gyro {
    /// Heading in degrees in the gyro's own convention. The value is not wrapped.
    fn get_angle(&self) -> f64;

    /// Set the current heading to zero.
    fn reset(&mut self);
}

/// A tank drivetrain.
pub trait TankDrive {
    /// Command the two sides, each normalised to [-1, 1].
    fn move_tank(&mut self, left: f64, right: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The drivetrain equipment used by the robot.
pub struct DriveHal {
    pub left_encoder: Box<dyn Encoder>,
    pub right_encoder: Box<dyn Encoder>,
    pub gyro: Box<dyn Gyro>,
    pub drive: Box<dyn TankDrive>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveHal {
    /// Read all drivetrain sensors.
    pub fn read_sens(&self) -> DriveSensData {
        DriveSensData {
            left_count: self.left_encoder.get(),
            right_count: self.right_encoder.get(),
            gyro_angle_deg: self.gyro.get_angle(),
        }
    }

    pub fn send_dems(&mut self, dems: &TankDems) {
        self.drive.move_tank(dems.left, dems.right);
    }

    pub fn reset_gyro(&mut self) {
        self.gyro.reset();
    }
}

// ------------------------------------------------------------------------------------------------
// DRY RUN
// ------------------------------------------------------------------------------------------------

/// An ideal drivetrain with no dynamics.
///
/// Each demand moves the wheels at `demand * max_speed_fts` for one cycle, and the encoders and
/// gyro report the resulting position exactly. The gyro is clockwise positive.
pub mod dry_run {
    use std::{cell::RefCell, rc::Rc};

    use log::trace;
    use serde::Deserialize;
    use util::maths::r2d;

    use super::*;

    /// Geometry of the dry run drivetrain.
    #[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
    pub struct DryRunParams {
        /// Units: feet
        pub wheelbase_width_ft: f64,

        /// Wheel speed at a demand of 1.0.
        ///
        /// Units: feet/second
        pub max_speed_fts: f64,

        pub encoder_ticks_per_rev: f64,

        /// Units: feet
        pub wheel_diameter_ft: f64,

        /// Time each demand is applied for.
        ///
        /// Units: seconds
        pub cycle_period_s: f64,
    }

    /// Shared state of the dry run equipment.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct DryRunState {
        pub left_ft: f64,
        pub right_ft: f64,

        /// Counter-clockwise positive.
        ///
        /// Units: radians
        pub heading_rad: f64,

        /// Heading at the last gyro reset.
        pub gyro_zero_rad: f64,
    }

    struct DryRunEncoder {
        state: Rc<RefCell<DryRunState>>,
        left: bool,
        ticks_per_ft: f64,
    }

    struct DryRunGyro(Rc<RefCell<DryRunState>>);

    struct DryRunDrive {
        state: Rc<RefCell<DryRunState>>,
        params: DryRunParams,
    }

    impl Default for DryRunParams {
        fn default() -> Self {
            Self {
                wheelbase_width_ft: 1.83,
                max_speed_fts: 3.4,
                encoder_ticks_per_rev: 1024.0,
                wheel_diameter_ft: 0.5,
                cycle_period_s: 0.02,
            }
        }
    }

    /// Build a HAL backed by the dry run drivetrain. The returned state handle can be used to
    /// inspect the simulated position.
    pub fn new_hal(params: DryRunParams) -> (DriveHal, Rc<RefCell<DryRunState>>) {
        let state = Rc::new(RefCell::new(DryRunState::default()));
        let ticks_per_ft =
            params.encoder_ticks_per_rev / (std::f64::consts::PI * params.wheel_diameter_ft);

        let hal = DriveHal {
            left_encoder: Box::new(DryRunEncoder {
                state: state.clone(),
                left: true,
                ticks_per_ft,
            }),
            right_encoder: Box::new(DryRunEncoder {
                state: state.clone(),
                left: false,
                ticks_per_ft,
            }),
            gyro: Box::new(DryRunGyro(state.clone())),
            drive: Box::new(DryRunDrive {
                state: state.clone(),
                params,
            }),
        };

        (hal, state)
    }

    impl Encoder for DryRunEncoder {
        fn get(&self) -> f64 {
            let s = self.state.borrow();
            match self.left {
                true => s.left_ft * self.ticks_per_ft,
                false => s.right_ft * self.ticks_per_ft,
            }
        }
    }

    impl Gyro for DryRunGyro {
        fn get_angle(&self) -> f64 {
            let s = self.0.borrow();
            -r2d(s.heading_rad - s.gyro_zero_rad)
        }

        fn reset(&mut self) {
            let mut s = self.0.borrow_mut();
            s.gyro_zero_rad = s.heading_rad;
        }
    }

    impl TankDrive for DryRunDrive {
        fn move_tank(&mut self, left: f64, right: f64) {
            let scale = self.params.max_speed_fts * self.params.cycle_period_s;
            let (dl, dr) = (left * scale, right * scale);

            let mut s = self.state.borrow_mut();
            s.left_ft += dl;
            s.right_ft += dr;
            s.heading_rad += (dr - dl) / self.params.wheelbase_width_ft;

            trace!("Dry run drivetrain: {:?}", *s);
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;
        use approx::assert_relative_eq;
        use comms_if::eqpt::drive::TankDems;

        #[test]
        fn test_straight() {
            let params = DryRunParams {
                encoder_ticks_per_rev: std::f64::consts::PI,
                wheel_diameter_ft: 1.0,
                max_speed_fts: 10.0,
                cycle_period_s: 0.1,
                ..Default::default()
            };
            let (mut hal, state) = new_hal(params);

            hal.send_dems(&TankDems::new(1.0, 1.0));
            hal.send_dems(&TankDems::new(0.5, 0.5));

            let sens = hal.read_sens();
            assert_relative_eq!(sens.left_count, 1.5, epsilon = 1e-9);
            assert_relative_eq!(sens.right_count, 1.5, epsilon = 1e-9);
            assert_relative_eq!(sens.gyro_angle_deg, 0.0);
            assert_relative_eq!(state.borrow().left_ft, 1.5, epsilon = 1e-9);
        }

        #[test]
        fn test_turn_and_reset() {
            let params = DryRunParams {
                wheelbase_width_ft: 2.0,
                max_speed_fts: 1.0,
                cycle_period_s: 1.0,
                ..Default::default()
            };
            let (mut hal, _) = new_hal(params);

            // Right side faster, so turning counter-clockwise, which is a negative gyro angle
            hal.send_dems(&TankDems::new(-0.5, 0.5));
            assert_relative_eq!(hal.read_sens().gyro_angle_deg, -(0.5f64).to_degrees());

            hal.reset_gyro();
            assert_relative_eq!(hal.read_sens().gyro_angle_deg, 0.0);
        }
    }
}
