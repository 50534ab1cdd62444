//! # Autonomy Telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be performed by the Autonomy system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AutoCmd {
    /// Select the trajectory followed by the autonomous routine the next time
    /// autonomous mode is entered.
    Select {
        /// Name of the trajectory in the trajectory store.
        path: String,
    },

    /// Abort the currently executing autonomous routine.
    Abort,
}
