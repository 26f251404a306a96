//! Line types.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::station::StationName;
use super::timetable::{DayType, Direction, Timetable, TimetableSet};

/// A line's display name, unique across the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineName(String);

impl LineName {
    /// Validate a raw string into a line name.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyName("line"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LineName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LineName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for LineName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LineName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LineName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Whole-second travel time for `distance_m` meters at `speed_kmh`.
pub fn travel_secs(distance_m: u32, speed_kmh: f64) -> u32 {
    ((3600.0 * f64::from(distance_m)) / (1000.0 * speed_kmh)).round() as u32
}

/// One inter-station stretch of a line, with its travel time at the line's
/// operating speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    pub from: &'a StationName,
    pub to: &'a StationName,
    pub distance_m: u32,
    pub travel_secs: u32,
}

/// A transit line: an ordered simple path of stations with per-segment
/// distances, an operating speed, and four timetable tables.
///
/// # Invariants
///
/// At least two stations, all distinct; `distances_m.len()` is exactly
/// `stations.len() - 1`; every distance and the speed are strictly
/// positive. Enforced by [`Line::new`], so holders can index segments
/// freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    name: LineName,
    color: String,
    speed_kmh: f64,
    stations: Vec<StationName>,
    distances_m: Vec<u32>,
    schedules: TimetableSet,
}

impl Line {
    /// Validate a line definition.
    ///
    /// # Errors
    ///
    /// `ModelError::MalformedLineDefinition` when the station sequence is
    /// shorter than two, contains a repeat, the distance count does not
    /// match, or a distance or the speed is not positive.
    pub fn new(
        name: LineName,
        stations: Vec<StationName>,
        distances_m: Vec<u32>,
        speed_kmh: f64,
    ) -> Result<Self, ModelError> {
        if stations.len() < 2 {
            return Err(ModelError::MalformedLineDefinition(format!(
                "line {name} must have at least 2 stations, got {}",
                stations.len()
            )));
        }
        for (i, station) in stations.iter().enumerate() {
            if stations[..i].contains(station) {
                return Err(ModelError::MalformedLineDefinition(format!(
                    "line {name} lists station {station} more than once"
                )));
            }
        }
        if distances_m.len() != stations.len() - 1 {
            return Err(ModelError::MalformedLineDefinition(format!(
                "line {name} has {} stations but {} distances, expected {}",
                stations.len(),
                distances_m.len(),
                stations.len() - 1
            )));
        }
        if let Some(&zero) = distances_m.iter().find(|&&d| d == 0) {
            return Err(ModelError::MalformedLineDefinition(format!(
                "line {name} has a non-positive segment distance ({zero})"
            )));
        }
        if !(speed_kmh > 0.0) {
            return Err(ModelError::MalformedLineDefinition(format!(
                "line {name} has a non-positive speed ({speed_kmh})"
            )));
        }

        Ok(Self {
            name,
            color: "#999999".to_string(),
            speed_kmh,
            stations,
            distances_m,
            schedules: TimetableSet::default(),
        })
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn name(&self) -> &LineName {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// The station sequence, start terminus first.
    pub fn stations(&self) -> &[StationName] {
        &self.stations
    }

    /// Per-segment distances, aligned with consecutive station pairs.
    pub fn distances_m(&self) -> &[u32] {
        &self.distances_m
    }

    /// Sum of all segment distances.
    pub fn total_length_m(&self) -> u32 {
        self.distances_m.iter().sum()
    }

    /// True if `station` appears in the sequence.
    pub fn serves(&self, station: &StationName) -> bool {
        self.stations.contains(station)
    }

    /// The terminus trains depart from when running in `direction`.
    pub fn terminus(&self, direction: Direction) -> &StationName {
        match direction {
            Direction::Outbound => &self.stations[0],
            Direction::Inbound => &self.stations[self.stations.len() - 1],
        }
    }

    /// Segments in sequence order, with travel times at the line's speed.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> + '_ {
        self.stations
            .windows(2)
            .zip(&self.distances_m)
            .map(|(pair, &distance_m)| Segment {
                from: &pair[0],
                to: &pair[1],
                distance_m,
                travel_secs: travel_secs(distance_m, self.speed_kmh),
            })
    }

    /// All four departure tables.
    pub fn schedules(&self) -> &TimetableSet {
        &self.schedules
    }

    /// The departure table for a (day-type, direction) pair.
    pub fn table(&self, day: DayType, direction: Direction) -> &Timetable {
        self.schedules.table(day, direction)
    }

    /// Replace one departure table.
    pub fn set_table(&mut self, day: DayType, direction: Direction, table: Timetable) {
        self.schedules.set(day, direction, table);
    }

    /// True if no table in any (day-type, direction) slot has departures.
    pub fn has_no_service(&self) -> bool {
        self.schedules.is_empty()
    }

    /// A copy of this line with `station` removed from the sequence.
    ///
    /// Removing a terminus drops the adjacent distance entry; removing an
    /// interior station merges its two adjacent entries into their sum, so
    /// the line's total length is preserved.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidStation` if the station is not on the line;
    /// `ModelError::MalformedLineDefinition` if removal would leave fewer
    /// than two stations.
    pub fn without_station(&self, station: &StationName) -> Result<Line, ModelError> {
        let pos = self
            .stations
            .iter()
            .position(|s| s == station)
            .ok_or_else(|| ModelError::InvalidStation(station.as_str().to_string()))?;

        if self.stations.len() == 2 {
            return Err(ModelError::MalformedLineDefinition(format!(
                "removing station {station} would leave line {} with fewer than 2 stations",
                self.name
            )));
        }

        let mut stations = self.stations.clone();
        stations.remove(pos);

        let mut distances_m = self.distances_m.clone();
        if pos == 0 {
            distances_m.remove(0);
        } else if pos == self.stations.len() - 1 {
            distances_m.pop();
        } else {
            let merged = distances_m[pos - 1] + distances_m[pos];
            distances_m[pos - 1] = merged;
            distances_m.remove(pos);
        }

        let mut reduced = Line::new(self.name.clone(), stations, distances_m, self.speed_kmh)?;
        reduced.color = self.color.clone();
        reduced.schedules = self.schedules.clone();
        Ok(reduced)
    }
}
