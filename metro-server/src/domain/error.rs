//! Model-side error taxonomy.
//!
//! Everything the network model can reject, raised before any mutation
//! commits so a failed edit leaves the model exactly as it was.

use thiserror::Error;

/// Errors raised by the network model and its mutation entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A station name that is not present in the model.
    #[error("unknown station: {0}")]
    InvalidStation(String),

    /// A line name that is not present in the model.
    #[error("unknown line: {0}")]
    InvalidLine(String),

    /// Adding a station under a name that is already taken.
    #[error("station already exists: {0}")]
    StationExists(String),

    /// Adding a line under a name that is already taken.
    #[error("line already exists: {0}")]
    LineExists(String),

    /// A line definition violating the structural invariants.
    #[error("malformed line definition: {0}")]
    MalformedLineDefinition(String),

    /// A timetable row outside the hour or minute bounds.
    #[error("malformed timetable: {0}")]
    MalformedTimetable(String),

    /// A station or line name that is empty after trimming.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
}
