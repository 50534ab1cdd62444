//! # Equipment Interface
//!
//! This module defines the interface structures passed between the executive and the equipment it
//! drives.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod drive;
