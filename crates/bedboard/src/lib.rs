//! Bed allocation and transfer engine for residential care facilities.
//!
//! Tracks bed occupancy across rooms and wards, matches residents to
//! eligible beds under clinical constraints, and performs atomic
//! resident-to-bed reassignments with a permanent audit trail.

pub mod allocation;
pub mod config;
pub mod error;
pub mod telemetry;
