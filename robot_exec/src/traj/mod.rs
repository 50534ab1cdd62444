//! # Trajectory module
//!
//! Trajectories are motion profiles generated offline and loaded at startup. Each one is a pair of
//! segment sequences, one for each side of the tank drivetrain, sampled at a fixed period. The
//! profiles are immutable once generated; this module only validates, stores and serves them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod segment;
mod store;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use segment::*;
pub use store::*;
