//! Motion segments and trajectories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Allowed difference between the left and right `dt` of a segment pair.
const DT_TOLERANCE_S: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One time step's setpoint within a motion profile.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSegment {
    /// Distance travelled along the profile by the end of this segment.
    ///
    /// Units: feet
    pub position: f64,

    /// Units: feet/second
    pub velocity: f64,

    /// Units: feet/second^2
    pub acceleration: f64,

    /// Planned heading, counter-clockwise positive.
    ///
    /// Units: radians
    pub heading: f64,

    /// Duration of the segment.
    ///
    /// Units: seconds
    pub dt: f64,
}

/// A left/right pair of segment sequences.
///
/// Both sides are non-empty, of equal length, and synchronised in time (the
/// segments at each index have the same `dt`). These are checked on
/// construction and on deserialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrajectory")]
pub struct Trajectory {
    left: Vec<MotionSegment>,
    right: Vec<MotionSegment>,
}

/// Unchecked form of a trajectory as it appears in a store file.
#[derive(Deserialize)]
struct RawTrajectory {
    left: Vec<MotionSegment>,
    right: Vec<MotionSegment>,
}

/// The sides of a tank drivetrain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a pair of segment sequences cannot form a trajectory.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrajError {
    #[error("The {0:?} side of the trajectory has no segments")]
    EmptySide(Side),

    #[error("The sides have different lengths (left {0}, right {1})")]
    LengthMismatch(usize, usize),

    #[error("The sides are not synchronised at segment {0} (left dt {1}, right dt {2})")]
    DtMismatch(usize, f64, f64),

    #[error("The {0:?} side contains a non-finite value at segment {1}")]
    NonFinite(Side, usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionSegment {
    fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.acceleration.is_finite()
            && self.heading.is_finite()
            && self.dt.is_finite()
    }
}

impl Trajectory {
    /// Build a trajectory from its two sides, checking that they are
    /// consistent.
    pub fn new(left: Vec<MotionSegment>, right: Vec<MotionSegment>) -> Result<Self, TrajError> {
        if left.is_empty() {
            return Err(TrajError::EmptySide(Side::Left));
        }
        if right.is_empty() {
            return Err(TrajError::EmptySide(Side::Right));
        }
        if left.len() != right.len() {
            return Err(TrajError::LengthMismatch(left.len(), right.len()));
        }

        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            if !l.is_finite() {
                return Err(TrajError::NonFinite(Side::Left, i));
            }
            if !r.is_finite() {
                return Err(TrajError::NonFinite(Side::Right, i));
            }
            if (l.dt - r.dt).abs() > DT_TOLERANCE_S {
                return Err(TrajError::DtMismatch(i, l.dt, r.dt));
            }
        }

        Ok(Self { left, right })
    }

    /// Get the segments for one side.
    pub fn side(&self, side: Side) -> &[MotionSegment] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn left(&self) -> &[MotionSegment] {
        &self.left
    }

    pub fn right(&self) -> &[MotionSegment] {
        &self.right
    }

    /// Number of segments per side.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Always false, a trajectory has at least one segment per side.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Total planned duration of the trajectory.
    ///
    /// Units: seconds
    pub fn duration_s(&self) -> f64 {
        self.left.iter().map(|s| s.dt).sum()
    }
}

impl std::convert::TryFrom<RawTrajectory> for Trajectory {
    type Error = TrajError;

    fn try_from(raw: RawTrajectory) -> Result<Self, Self::Error> {
        Trajectory::new(raw.left, raw.right)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn seg(position: f64, dt: f64) -> MotionSegment {
        MotionSegment {
            position,
            dt,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_trajectory() {
        let traj = Trajectory::new(
            vec![seg(0.0, 0.02), seg(1.0, 0.02)],
            vec![seg(0.0, 0.02), seg(1.2, 0.02)],
        )
        .unwrap();

        assert_eq!(traj.len(), 2);
        assert!(!traj.is_empty());
        assert_eq!(traj.side(Side::Right)[1].position, 1.2);
        assert!((traj.duration_s() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_trajectories() {
        assert_eq!(
            Trajectory::new(vec![], vec![seg(0.0, 0.02)]),
            Err(TrajError::EmptySide(Side::Left))
        );
        assert_eq!(
            Trajectory::new(vec![seg(0.0, 0.02)], vec![]),
            Err(TrajError::EmptySide(Side::Right))
        );
        assert_eq!(
            Trajectory::new(vec![seg(0.0, 0.02)], vec![seg(0.0, 0.02), seg(1.0, 0.02)]),
            Err(TrajError::LengthMismatch(1, 2))
        );
        assert_eq!(
            Trajectory::new(
                vec![seg(0.0, 0.02), seg(1.0, 0.02)],
                vec![seg(0.0, 0.02), seg(1.0, 0.05)]
            ),
            Err(TrajError::DtMismatch(1, 0.02, 0.05))
        );
        assert_eq!(
            Trajectory::new(vec![seg(std::f64::NAN, 0.02)], vec![seg(0.0, 0.02)]),
            Err(TrajError::NonFinite(Side::Left, 0))
        );
    }

    #[test]
    fn test_deserialise_checks_trajectory() {
        let ok = r#"{
            "left": [{"position": 0.0, "velocity": 0.0, "acceleration": 0.0, "heading": 0.0, "dt": 0.02}],
            "right": [{"position": 0.0, "velocity": 0.0, "acceleration": 0.0, "heading": 0.0, "dt": 0.02}]
        }"#;
        assert!(serde_json::from_str::<Trajectory>(ok).is_ok());

        let bad = r#"{"left": [], "right": []}"#;
        assert!(serde_json::from_str::<Trajectory>(bad).is_err());
    }
}
