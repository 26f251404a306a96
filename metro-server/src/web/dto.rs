//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, DayType, Line, Station, StationStatus};
use crate::planner::{Itinerary, SearchGoal};

/// Query for station name search.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Substring to match against station names, case-insensitive
    pub q: String,
}

/// Request to plan a route.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// Boarding station name
    pub origin: String,

    /// Alighting station name
    pub destination: String,

    /// Departure instant, "HH:MM" or "HH:MM:SS" (defaults to now)
    pub departure: Option<String>,

    /// Which timetable tables apply (defaults to today's)
    pub day_type: Option<DayType>,

    /// Search goal (defaults to fastest_time)
    pub optimize: Option<SearchGoal>,
}

/// A station record in the shape the rendering layer consumes.
///
/// Field order is part of the contract with the map layer: id, name,
/// lines, status, coordinates.
#[derive(Debug, Serialize)]
pub struct StationRecord {
    pub id: String,
    pub name: String,
    pub lines: Vec<String>,
    pub status: StationStatus,
    pub coordinates: Coordinate,
}

/// GeoJSON projection of the station set, the map layer's point source.
#[derive(Debug, Serialize)]
pub struct StationCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Serialize)]
pub struct StationFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: StationProperties,
}

#[derive(Debug, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: Coordinate,
}

#[derive(Debug, Serialize)]
pub struct StationProperties {
    pub name: String,
    pub lines: Vec<String>,
    pub status: StationStatus,
}

/// A line in the overview listing.
#[derive(Debug, Serialize)]
pub struct LineSummary {
    pub name: String,
    pub color: String,
    pub stations: Vec<String>,
    pub total_length_m: u32,
}

/// A planned route.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Every station visited, origin first
    pub path: Vec<String>,

    /// Instant the rider asked to leave
    pub requested_departure: String,

    /// Instant the first train departs
    pub departure_time: String,

    /// Final arrival instant
    pub arrival_time: String,

    /// Elapsed minutes from the requested departure to arrival
    pub total_mins: f64,

    /// Number of line changes
    pub transfers: usize,

    /// Stations where the rider changes lines
    pub transfer_points: Vec<TransferPoint>,

    /// Ridden distance in kilometres
    pub distance_km: f64,

    /// Fare in yuan
    pub fare: u32,

    /// One entry per line ridden
    pub legs: Vec<RouteLeg>,

    /// Where the elapsed time goes
    pub time_summary: TimeSummary,
}

/// A line change within a route.
#[derive(Debug, Serialize)]
pub struct TransferPoint {
    pub station: String,
    pub from_line: String,
    pub to_line: String,
}

/// One stretch ridden on a single line.
#[derive(Debug, Serialize)]
pub struct RouteLeg {
    pub line: String,
    pub from: String,
    pub to: String,
    pub departure: String,
    pub arrival: String,
    pub stops: u32,
    pub distance_m: u32,
}

/// Breakdown of the elapsed time.
#[derive(Debug, Serialize)]
pub struct TimeSummary {
    /// Minutes waited at the origin before the first departure
    pub initial_wait_mins: f64,

    /// Minutes spent riding
    pub ride_mins: f64,

    /// Minutes spent changing lines and waiting on platforms
    pub interchange_mins: f64,
}

/// Service counters for monitoring.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Stations in the published model
    pub stations: usize,

    /// Lines in the published model
    pub lines: usize,

    /// Mutation count of the published model
    pub revision: u64,

    /// Itineraries currently held by the query cache
    pub cached_routes: u64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StationRecord {
    /// Create from a domain Station and the names of the lines serving it.
    pub fn new(station: &Station, lines: Vec<String>) -> Self {
        Self {
            id: station.id.clone(),
            name: station.name.as_str().to_string(),
            lines,
            status: station.status,
            coordinates: station.coordinate,
        }
    }
}

impl StationCollection {
    pub fn new(features: Vec<StationFeature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

impl StationFeature {
    /// Create from a domain Station and the names of the lines serving it.
    pub fn new(station: &Station, lines: Vec<String>) -> Self {
        Self {
            kind: "Feature",
            geometry: PointGeometry {
                kind: "Point",
                coordinates: station.coordinate,
            },
            properties: StationProperties {
                name: station.name.as_str().to_string(),
                lines,
                status: station.status,
            },
        }
    }
}

impl LineSummary {
    /// Create from a domain Line.
    pub fn from_line(line: &Line) -> Self {
        Self {
            name: line.name().as_str().to_string(),
            color: line.color().to_string(),
            stations: line
                .stations()
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            total_length_m: line.total_length_m(),
        }
    }
}

impl RouteResponse {
    /// Create from a domain Itinerary.
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        let legs: Vec<RouteLeg> = itinerary
            .legs
            .iter()
            .map(|leg| RouteLeg {
                line: leg.line.as_str().to_string(),
                from: leg.from.as_str().to_string(),
                to: leg.to.as_str().to_string(),
                departure: leg.depart.to_string(),
                arrival: leg.arrive.to_string(),
                stops: leg.stops,
                distance_m: leg.distance_m,
            })
            .collect();

        let transfer_points = itinerary
            .legs
            .windows(2)
            .map(|pair| TransferPoint {
                station: pair[1].from.as_str().to_string(),
                from_line: pair[0].line.as_str().to_string(),
                to_line: pair[1].line.as_str().to_string(),
            })
            .collect();

        // The inter-leg gaps are whatever the total leaves after the
        // initial wait and the riding itself.
        let initial_wait_secs = itinerary.departure.secs() - itinerary.requested_departure.secs();
        let ride_secs: u32 = itinerary
            .legs
            .iter()
            .map(|leg| leg.arrive.secs() - leg.depart.secs())
            .sum();
        let interchange_secs = itinerary.total_secs - initial_wait_secs - ride_secs;

        Self {
            path: itinerary
                .stations
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            requested_departure: itinerary.requested_departure.to_string(),
            departure_time: itinerary.departure.to_string(),
            arrival_time: itinerary.arrival.to_string(),
            total_mins: mins(itinerary.total_secs),
            transfers: itinerary.transfer_count(),
            transfer_points,
            distance_km: km(itinerary.total_distance_m),
            fare: itinerary.fare_yuan,
            legs,
            time_summary: TimeSummary {
                initial_wait_mins: mins(initial_wait_secs),
                ride_mins: mins(ride_secs),
                interchange_mins: mins(interchange_secs),
            },
        }
    }
}

/// Seconds as minutes, rounded to one decimal place.
fn mins(secs: u32) -> f64 {
    (secs as f64 / 60.0 * 10.0).round() / 10.0
}

/// Meters as kilometres, rounded to two decimal places.
fn km(meters: u32) -> f64 {
    (meters as f64 / 1000.0 * 100.0).round() / 100.0
}
