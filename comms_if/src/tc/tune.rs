//! # Tuning Telecommands

use serde::{Deserialize, Serialize};

/// Set the controller gain called `gain` to `value`.
///
/// Gain names are those of the trajectory follower's `ControllerGains`, for
/// example `k_v` or `head_k_p`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TuneCmd {
    pub gain: String,
    pub value: f64,
}
