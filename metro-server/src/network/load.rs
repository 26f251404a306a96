//! Network snapshot loading.
//!
//! The editing subsystem persists the whole network as a single JSON
//! document. This module reads one and replays it through the model's own
//! mutation entry points, so every structural check applies at ingestion
//! and a malformed row is rejected with the record that carried it, never
//! discovered mid-search.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::{
    Coordinate, DayType, Direction, Line, LineName, ModelError, Station, StationName,
    StationStatus, Timetable,
};

use super::Network;

/// Speed assumed for lines whose record omits one, in km/h.
const DEFAULT_SPEED_KMH: f64 = 35.0;

/// Errors that can occur while loading a network snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Reading the snapshot file failed.
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON of the expected shape.
    #[error("parse network snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// A record failed the model's structural checks.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Top-level snapshot document.
#[derive(Debug, Default, Deserialize)]
pub struct NetworkFile {
    #[serde(default)]
    stations: Vec<StationRow>,
    #[serde(default)]
    lines: Vec<LineRow>,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    status: StationStatus,
    coordinates: Coordinate,
}

#[derive(Debug, Deserialize)]
struct LineRow {
    name: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    speed_kmh: Option<f64>,
    stations: Vec<String>,
    distances_m: Vec<u32>,
    #[serde(default)]
    timetables: TimetableRows,
}

#[derive(Debug, Default, Deserialize)]
struct TimetableRows {
    #[serde(default)]
    workday: DirectionRows,
    #[serde(default)]
    rest_day: DirectionRows,
}

#[derive(Debug, Default, Deserialize)]
struct DirectionRows {
    #[serde(default)]
    outbound: BTreeMap<u8, Vec<u8>>,
    #[serde(default)]
    inbound: BTreeMap<u8, Vec<u8>>,
}

/// Load and validate a network snapshot from a file.
pub fn load_network(path: &Path) -> Result<Network, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_network(&text)
}

/// Parse and validate a network snapshot from JSON text.
pub fn parse_network(text: &str) -> Result<Network, LoadError> {
    let file: NetworkFile = serde_json::from_str(text)?;
    build_network(file)
}

fn build_network(file: NetworkFile) -> Result<Network, LoadError> {
    let mut network = Network::new();

    for row in file.stations {
        let name = StationName::new(&row.name)?;
        let mut station = Station::new(name, row.coordinates).with_status(row.status);
        if let Some(id) = row.id {
            station = station.with_id(id);
        }
        network.add_station(station)?;
    }

    for row in file.lines {
        let name = LineName::new(&row.name)?;
        let stations = row
            .stations
            .iter()
            .map(|s| StationName::new(s))
            .collect::<Result<Vec<_>, _>>()?;
        let speed = row.speed_kmh.unwrap_or(DEFAULT_SPEED_KMH);

        let mut line = Line::new(name, stations, row.distances_m, speed)?;
        if let Some(color) = row.color {
            line = line.with_color(color);
        }

        let tables = row.timetables;
        line.set_table(
            DayType::Workday,
            Direction::Outbound,
            Timetable::new(tables.workday.outbound)?,
        );
        line.set_table(
            DayType::Workday,
            Direction::Inbound,
            Timetable::new(tables.workday.inbound)?,
        );
        line.set_table(
            DayType::RestDay,
            Direction::Outbound,
            Timetable::new(tables.rest_day.outbound)?,
        );
        line.set_table(
            DayType::RestDay,
            Direction::Inbound,
            Timetable::new(tables.rest_day.inbound)?,
        );

        network.add_line(line)?;
    }

    Ok(network)
}
