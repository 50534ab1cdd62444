//! Trajectory store
//!
//! The store is a mapping from trajectory name to [`Trajectory`], persisted as JSON by the offline
//! generation step:
//!
//! ```json
//! {
//!     "charge": {
//!         "left": [{"position": 0.0, "velocity": 0.0, "acceleration": 0.0, "heading": 0.0, "dt": 0.02}],
//!         "right": [{"position": 0.0, "velocity": 0.0, "acceleration": 0.0, "heading": 0.0, "dt": 0.02}]
//!     }
//! }
//! ```
//!
//! Additional per-segment fields written by the generator (such as `x`, `y` or `jerk`) are
//! ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

// Internal
use super::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Named trajectories available to the robot for the lifetime of a match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryStore {
    trajectories: BTreeMap<String, Trajectory>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when loading or saving the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot read the trajectory store: {0}")]
    ReadError(std::io::Error),

    #[error("Cannot parse the trajectory store: {0}")]
    ParseError(serde_json::Error),

    #[error("Cannot serialise the trajectory store: {0}")]
    SerialiseError(serde_json::Error),

    #[error("Cannot write the trajectory store: {0}")]
    WriteError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from the given file.
    ///
    /// A missing file is not an error, it means no trajectories have been
    /// generated yet, and an empty store is returned. A file which exists but
    /// is unreadable or contains invalid trajectories is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();

        let store_str = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "No trajectory store found at {:?}, no trajectories will be available",
                    path
                );
                return Ok(Self::new());
            }
            Err(e) => return Err(StoreError::ReadError(e)),
        };

        let store = Self::from_json(&store_str)?;

        info!(
            "Loaded {} trajectories from {:?}: {:?}",
            store.len(),
            path,
            store.names().collect::<Vec<_>>()
        );

        Ok(store)
    }

    /// Parse a store from its JSON representation.
    pub fn from_json(json_str: &str) -> Result<Self, StoreError> {
        Ok(Self {
            trajectories: serde_json::from_str(json_str).map_err(StoreError::ParseError)?,
        })
    }

    /// Write the store to the given file, replacing any existing one.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let store_str =
            serde_json::to_string(&self.trajectories).map_err(StoreError::SerialiseError)?;

        fs::write(path, store_str).map_err(StoreError::WriteError)
    }

    /// Add a trajectory to the store, returning the one it replaced if any.
    pub fn insert<S: Into<String>>(&mut self, name: S, traj: Trajectory) -> Option<Trajectory> {
        self.trajectories.insert(name.into(), traj)
    }

    /// Get the trajectory with the given name, or `None` if it hasn't been
    /// generated.
    pub fn get(&self, name: &str) -> Option<&Trajectory> {
        self.trajectories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.trajectories.contains_key(name)
    }

    /// Iterate over the names of all stored trajectories in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trajectories.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
