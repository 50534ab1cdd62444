//! # Robot library.
//!
//! This library allows other crates in the workspace, along with the integration tests and
//! benchmarks, to access items defined inside the robot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy manager - sequences the autonomous routine
pub mod auto;

/// Global data store of the executable
pub mod data_store;

/// Hardware abstraction - the drivetrain encoders, gyro and motors
pub mod hal;

/// Robot lifecycle - mode changes and the per-cycle processing
pub mod robot;

/// Telecommand processor - applies TCs to the robot
pub mod tc_processor;

/// Trajectories and the trajectory store
pub mod traj;

/// Trajectory following module - keeps the robot on the given trajectory
pub mod traj_follow;
