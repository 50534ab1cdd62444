//! # Trajectory follower controllers
//!
//! This module provides the two controllers used by the trajectory follower:
//!
//! - [`SegmentFollower`], one per side of the drivetrain, which steps through that side's motion
//!   profile one segment per cycle and outputs a feed-forward plus PD drive demand.
//! - [`HeadingCorrector`], a PD controller on the difference between the planned and measured
//!   heading, whose output is applied as a differential trim to both sides.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::ControllerGains;
use crate::traj::MotionSegment;
use util::maths::bound_half_degrees;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows one side of a trajectory using encoder feedback.
#[derive(Debug, Clone, Default)]
pub struct SegmentFollower {
    /// The segments being followed, or `None` if no trajectory has been set.
    segments: Option<Vec<MotionSegment>>,

    /// Index of the next segment to calculate.
    segment_index: usize,

    /// Distance error on the previous cycle.
    last_error: f64,

    /// Heading of the most recently calculated segment.
    ///
    /// Units: radians
    heading: f64,

    /// Encoder reading at the start of the trajectory.
    encoder_offset: f64,

    /// Encoder counts per wheel revolution.
    ticks_per_rev: f64,

    /// Distance travelled per wheel revolution.
    wheel_circumference: f64,
}

/// PD controller on heading error.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HeadingCorrector {
    /// Heading error on the previous call.
    ///
    /// Units: degrees
    last_error_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SegmentFollower {
    /// Create a follower with no trajectory.
    ///
    /// The encoder is treated as reporting distance directly until
    /// `configure` is called.
    pub fn new() -> Self {
        Self {
            ticks_per_rev: 1.0,
            wheel_circumference: 1.0,
            ..Default::default()
        }
    }

    /// Set the encoder zero reference and unit conversion.
    ///
    /// `initial_count` is the encoder reading at which the follower considers
    /// the robot to be at the start of the profile. Must be called before
    /// `set_trajectory`.
    pub fn configure(&mut self, initial_count: f64, ticks_per_rev: f64, wheel_circumference: f64) {
        self.encoder_offset = initial_count;
        self.ticks_per_rev = ticks_per_rev;
        self.wheel_circumference = wheel_circumference;
    }

    /// Start following the given segments from the first one.
    pub fn set_trajectory(&mut self, segments: Vec<MotionSegment>) {
        self.segments = Some(segments);
        self.segment_index = 0;
        self.last_error = 0.0;
        self.heading = 0.0;
    }

    /// Drop the current trajectory.
    pub fn clear(&mut self) {
        self.segments = None;
        self.segment_index = 0;
        self.last_error = 0.0;
        self.heading = 0.0;
    }

    /// Calculate the drive demand for this cycle and advance to the next
    /// segment.
    ///
    /// Once every segment has been used the demand is zero and the follower
    /// is finished.
    pub fn calculate(&mut self, encoder_count: f64, gains: &ControllerGains) -> f64 {
        let seg = match self
            .segments
            .as_ref()
            .and_then(|s| s.get(self.segment_index))
        {
            Some(s) => *s,
            None => return 0.0,
        };

        let error = seg.position - self.distance_covered(encoder_count);

        let demand = gains.k_v * seg.velocity
            + gains.k_a * seg.acceleration
            + gains.k_p * error
            + gains.k_d * (error - self.last_error);

        self.last_error = error;
        self.heading = seg.heading;
        self.segment_index += 1;

        demand
    }

    /// Distance travelled since `configure` for the given encoder reading.
    pub fn distance_covered(&self, encoder_count: f64) -> f64 {
        (encoder_count - self.encoder_offset) / self.ticks_per_rev * self.wheel_circumference
    }

    /// True once every segment of the trajectory has been calculated, or if
    /// there is no trajectory.
    pub fn is_finished(&self) -> bool {
        match self.segments {
            Some(ref s) => self.segment_index >= s.len(),
            None => true,
        }
    }

    pub fn has_trajectory(&self) -> bool {
        self.segments.is_some()
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    /// Heading of the most recently calculated segment.
    ///
    /// Units: radians
    pub fn heading(&self) -> f64 {
        self.heading
    }
}

impl HeadingCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the trim for the given measured and planned headings.
    ///
    /// The error is bound to (-180, 180] so the trim always turns the short
    /// way. A positive trim should be subtracted from the left side and added
    /// to the right.
    pub fn correct(
        &mut self,
        measured_heading_deg: f64,
        planned_heading_deg: f64,
        gains: &ControllerGains,
    ) -> f64 {
        let error = bound_half_degrees(planned_heading_deg - measured_heading_deg);

        let trim = gains.head_k_p * error + gains.head_k_d * (error - self.last_error_deg);

        self.last_error_deg = error;

        trim
    }

    pub fn reset(&mut self) {
        self.last_error_deg = 0.0;
    }

    /// Heading error of the previous call.
    ///
    /// Units: degrees
    pub fn last_error_deg(&self) -> f64 {
        self.last_error_deg
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
