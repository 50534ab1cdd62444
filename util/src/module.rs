//! Cyclic module interface
//!
//! Every control module the robot steps once per cycle (the trajectory follower for example)
//! implements [`State`]. The executive calls [`State::init`] once at startup, with the module's
//! parameter file and the session its archives go into, and then [`State::proc`] once per cycle
//! with that cycle's sensor data.
//!
//! A `proc` that returns `Err` must leave the module as it was before the call, so that a single
//! bad cycle can be skipped and the next one processed normally.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module processed once per robot cycle.
pub trait State {
    /// Data required during initialisation, usually the name of the parameter file.
    type InitData;
    type InitError;

    /// Data the module consumes each cycle.
    type InputData;
    /// Data produced each cycle, e.g. drivetrain demands. `None`-like outputs mean the module has
    /// nothing to command this cycle.
    type OutputData;
    /// Per-cycle report, archived by the executive.
    type StatusReport;
    type ProcError;

    /// Load parameters and open the module's archives in `session`.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError>;

    /// Process one cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
