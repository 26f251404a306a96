//! Time-dependent route planner.
//!
//! This module answers the system's central question: "leaving this station
//! at this instant, on this day, how do I best reach that station?" The
//! search (`search`) runs Dijkstra over `(station, line)` labels with
//! timetable-resolved boarding costs, and the formatter (`itinerary`)
//! projects the winning ride sequence into legs, transfers, totals, and a
//! fare.

mod config;
mod fare;
mod itinerary;
mod search;

pub use config::SearchConfig;
pub use fare::FareTable;
pub use itinerary::{Itinerary, Leg};
pub use search::{Planner, Ride, RouteError, RouteQuery, SearchGoal};
