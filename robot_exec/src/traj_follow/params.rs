//! Trajectory follower parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::ControllerGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory following
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TrajFollowParams {
    /// Initial controller gains. These may be changed at runtime.
    pub gains: ControllerGains,

    /// Number of encoder counts per wheel revolution.
    pub encoder_ticks_per_rev: f64,

    /// Diameter of the drive wheels. The units of this set the distance units
    /// of the follower, and must match those of the trajectory store.
    ///
    /// Units: feet
    pub wheel_diameter_ft: f64,

    /// Path to the trajectory store file, relative to the software root.
    pub store_file: String,

    /// If true the gyro angle is negated before being compared to the planned
    /// heading. Set this when the gyro is clockwise positive, since planned
    /// headings are counter-clockwise positive.
    pub invert_gyro: bool,

    /// The limit on the distance error of either side. Above this limit the
    /// trajectory is abandoned. If not set there is no limit.
    ///
    /// Units: feet
    #[serde(default)]
    pub max_distance_error_ft: Option<f64>,
}

/// A parameter that would make the encoder distance conversion meaningless.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq)]
pub enum InvalidParamsError {
    #[error("Encoder ticks per revolution must be positive and finite, got {0}")]
    EncoderTicksPerRev(f64),

    #[error("Wheel diameter must be positive and finite, got {0} ft")]
    WheelDiameter(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TrajFollowParams {
    fn default() -> Self {
        Self {
            gains: ControllerGains::default(),
            encoder_ticks_per_rev: 1024.0,
            wheel_diameter_ft: 0.5,
            store_file: String::from("trajectories/trajectories.json"),
            invert_gyro: true,
            max_distance_error_ft: None,
        }
    }
}

impl TrajFollowParams {
    /// Circumference of the drive wheels.
    ///
    /// Units: feet
    pub fn wheel_circumference_ft(&self) -> f64 {
        std::f64::consts::PI * self.wheel_diameter_ft
    }

    /// Check the drivetrain geometry, which every encoder reading is divided through.
    pub fn validate(&self) -> Result<(), InvalidParamsError> {
        if !(self.encoder_ticks_per_rev.is_finite() && self.encoder_ticks_per_rev > 0.0) {
            return Err(InvalidParamsError::EncoderTicksPerRev(self.encoder_ticks_per_rev));
        }

        if !(self.wheel_diameter_ft.is_finite() && self.wheel_diameter_ft > 0.0) {
            return Err(InvalidParamsError::WheelDiameter(self.wheel_diameter_ft));
        }

        Ok(())
    }
}
