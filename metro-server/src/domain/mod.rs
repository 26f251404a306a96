//! Domain types for the metro network.
//!
//! The core model vocabulary: validated names, stations, lines, timetable
//! tables, and the day-local time type. Every type enforces its invariants
//! at construction, so code receiving these values can trust them.

mod error;
mod line;
mod station;
mod time;
mod timetable;

pub use error::ModelError;
pub use line::{Line, LineName, Segment, travel_secs};
pub use station::{Coordinate, Station, StationName, StationStatus};
pub use time::{SECS_PER_DAY, TimeError, TimeOfDay};
pub use timetable::{DayType, Direction, Timetable, TimetableSet};
