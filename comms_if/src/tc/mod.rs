//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod auto;
pub mod tune;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use self::{auto::AutoCmd, tune::TuneCmd};

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static TYPE_HAS_NO_PAYLOAD: [&str; 2] = ["SAFE", "UNSAFE"];

static KNOWN_TYPES: [&str; 5] = ["SAFE", "UNSAFE", "MODE", "TUNE", "AUTO"];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the robot by an operator or a
/// script.
///
/// The JSON form is `{"type": "<TYPE>", "payload": <payload>}`, where the
/// payload is omitted for `SAFE` and `UNSAFE`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Stop the drivetrain and reject all demands until `MakeUnsafe`.
    #[serde(rename = "SAFE")]
    MakeSafe,

    /// Clear a safe mode previously entered with `MakeSafe`.
    #[serde(rename = "UNSAFE")]
    MakeUnsafe,

    /// Switch the robot into the given mode.
    #[serde(rename = "MODE")]
    Mode(RobotMode),

    /// Set a controller gain by name.
    #[serde(rename = "TUNE")]
    Tune(TuneCmd),

    /// Command the autonomy system.
    #[serde(rename = "AUTO")]
    Auto(AutoCmd),
}

/// The operating modes of the robot.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum RobotMode {
    Disabled,
    Autonomous,
    Teleop,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0} is expected to have a payload but it doesn't")]
    MissingPayload(String),

    #[error("TC of type {0} has an invalid payload: {1}")]
    InvalidPayload(String, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let mut val: Value = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        // Get the type of the TC
        let tc_type = match val["type"].as_str() {
            Some(s) => s.to_string(),
            None => {
                return Err(TcParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        if !KNOWN_TYPES.contains(&tc_type.as_str()) {
            return Err(TcParseError::InvalidType(format!(
                "{} is not a recognised TC type",
                tc_type
            )));
        }

        // Types without payloads are unit variants, which serde expects to
        // have no content at all.
        if TYPE_HAS_NO_PAYLOAD.contains(&tc_type.as_str()) {
            if let Some(obj) = val.as_object_mut() {
                obj.remove("payload");
            }
        } else if val["payload"].is_null() {
            return Err(TcParseError::MissingPayload(tc_type));
        }

        serde_json::from_value(val).map_err(|e| TcParseError::InvalidPayload(tc_type, e))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
