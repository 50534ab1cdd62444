//! # Trajectory following module
//!
//! Trajectory following keeps the robot on a pre-generated motion profile. Each side of the tank
//! drivetrain has its own [`SegmentFollower`], which steps through that side's profile one segment
//! per cycle. The demand for a side is the velocity and acceleration feed-forward of the current
//! segment, plus a PD correction on the distance error measured by that side's encoder.
//!
//! On top of this a [`HeadingCorrector`] compares the planned heading of the current segment with
//! the gyro heading, and trims the two sides differentially to turn the robot back onto the
//! planned heading without changing its forward speed.
//!
//! [`TrajFollower`] owns all three controllers and the trajectory store. Only one trajectory is
//! followed at a time; starting another replaces it immediately.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod gains;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use controllers::*;
pub use gains::*;
pub use params::{InvalidParamsError, TrajFollowParams};
pub use state::*;
