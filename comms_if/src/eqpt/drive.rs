//! # Drivetrain Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sensor data read from the drivetrain at the start of a cycle.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct DriveSensData {
    /// Cumulative reading of the left side encoder.
    ///
    /// Units: encoder counts
    pub left_count: f64,

    /// Cumulative reading of the right side encoder.
    ///
    /// Units: encoder counts
    pub right_count: f64,

    /// Gyro heading as reported by the gyro. Clockwise is positive on the reference hardware, and
    /// the value is not wrapped.
    ///
    /// Units: degrees
    pub gyro_angle_deg: f64,
}

/// Tank drive demands sent to the drivetrain once per cycle.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct TankDems {
    /// Left side speed demand, normalised so that 1.0 is full forward.
    pub left: f64,

    /// Right side speed demand, normalised so that 1.0 is full forward.
    pub right: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TankDems {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Demands which bring the drivetrain to a stop.
    pub fn stop() -> Self {
        Self::default()
    }

    /// Saturate both sides to `[-limit, limit]`, returning true if either side was limited.
    pub fn saturate(&mut self, limit: f64) -> bool {
        let mut limited = false;

        for side in [&mut self.left, &mut self.right].iter_mut() {
            if **side > limit {
                **side = limit;
                limited = true;
            }
            if **side < -limit {
                **side = -limit;
                limited = true;
            }
        }

        limited
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
