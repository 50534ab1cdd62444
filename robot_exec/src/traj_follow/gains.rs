//! Runtime tunable controller gains

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Names of all tunable gains, as accepted by [`ControllerGains::get`] and
/// [`ControllerGains::set`].
pub const GAIN_NAMES: [&str; 6] = ["k_p", "k_d", "k_v", "k_a", "head_k_p", "head_k_d"];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of the segment followers and the heading corrector.
///
/// These are read on every cycle, so a value changed with [`ControllerGains::set`] takes effect on
/// the next call to the controllers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerGains {
    /// Proportional gain on distance error.
    pub k_p: f64,

    /// Derivative gain on distance error, applied to the per-cycle change in
    /// error.
    pub k_d: f64,

    /// Velocity feed-forward gain.
    pub k_v: f64,

    /// Acceleration feed-forward gain.
    pub k_a: f64,

    /// Proportional gain on heading error.
    pub head_k_p: f64,

    /// Derivative gain on heading error.
    pub head_k_d: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GainError {
    #[error("No gain called {0:?}")]
    UnknownGain(String),

    #[error("Gain {0} cannot be set to {1}, gains must be finite")]
    NonFinite(String, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ControllerGains {
    fn default() -> Self {
        Self {
            k_p: 1.0,
            k_d: 0.1,
            k_v: 0.831,
            k_a: 0.033,
            head_k_p: 1.0,
            head_k_d: 0.25,
        }
    }
}

impl ControllerGains {
    /// All gains zero, the controllers output nothing.
    pub fn zero() -> Self {
        Self {
            k_p: 0.0,
            k_d: 0.0,
            k_v: 0.0,
            k_a: 0.0,
            head_k_p: 0.0,
            head_k_d: 0.0,
        }
    }

    /// Read a gain by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "k_p" => Some(self.k_p),
            "k_d" => Some(self.k_d),
            "k_v" => Some(self.k_v),
            "k_a" => Some(self.k_a),
            "head_k_p" => Some(self.head_k_p),
            "head_k_d" => Some(self.head_k_d),
            _ => None,
        }
    }

    /// Set a gain by name, returning its previous value.
    pub fn set(&mut self, name: &str, value: f64) -> Result<f64, GainError> {
        if !value.is_finite() {
            return Err(GainError::NonFinite(name.to_string(), value));
        }

        let gain = match name {
            "k_p" => &mut self.k_p,
            "k_d" => &mut self.k_d,
            "k_v" => &mut self.k_v,
            "k_a" => &mut self.k_a,
            "head_k_p" => &mut self.head_k_p,
            "head_k_d" => &mut self.head_k_d,
            _ => return Err(GainError::UnknownGain(name.to_string())),
        };

        Ok(std::mem::replace(gain, value))
    }
}
