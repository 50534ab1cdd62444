//! # AutoMgr Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AutoMgrParams {
    /// Name of the trajectory followed when autonomous mode starts, unless another has been
    /// selected.
    pub default_path: String,
}

impl Default for AutoMgrParams {
    fn default() -> Self {
        Self {
            default_path: String::from("left-side"),
        }
    }
}
