//! Station types.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// A station's display name, the model's primary key.
///
/// Names are trimmed at construction and must be non-empty. Lookups in
/// name-keyed maps work directly with `&str` borrows.
///
/// # Examples
///
/// ```
/// use metro_server::domain::StationName;
///
/// let name = StationName::new("  Dongzhimen ").unwrap();
/// assert_eq!(name.as_str(), "Dongzhimen");
///
/// assert!(StationName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationName(String);

impl StationName {
    /// Validate a raw string into a station name.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyName("station"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for StationName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StationName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StationName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Operating status of a station.
///
/// Only in-service stations are boardable; the others exist for the editor
/// and the map but are bridged out of the routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    #[default]
    InService,
    UnderConstruction,
    Planned,
}

impl StationStatus {
    /// True if riders can board, alight, or transfer here.
    pub fn is_in_service(self) -> bool {
        matches!(self, StationStatus::InService)
    }
}

/// Longitude / latitude pair, serialized in GeoJSON order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate(pub f64, pub f64);

impl Coordinate {
    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

/// A network station.
///
/// The `id` is the stable identifier the rendering layer keys features by;
/// it defaults to the name and the model never interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: StationName,
    pub status: StationStatus,
    pub coordinate: Coordinate,
}

impl Station {
    /// Create an in-service station with `id` equal to the name.
    pub fn new(name: StationName, coordinate: Coordinate) -> Self {
        Self {
            id: name.as_str().to_string(),
            name,
            status: StationStatus::InService,
            coordinate,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_status(mut self, status: StationStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_trims_and_rejects_empty() {
        assert_eq!(StationName::new(" X ").unwrap().as_str(), "X");
        assert_eq!(
            StationName::new(""),
            Err(ModelError::EmptyName("station"))
        );
        assert_eq!(
            StationName::new("  \t"),
            Err(ModelError::EmptyName("station"))
        );
    }

    #[test]
    fn name_serde_is_transparent_and_validating() {
        let name = StationName::new("Dongzhimen").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"Dongzhimen\"");
        let back: StationName = serde_json::from_str("\"Dongzhimen\"").unwrap();
        assert_eq!(back, name);
        assert!(serde_json::from_str::<StationName>("\"  \"").is_err());
    }

    #[test]
    fn status_serde_tags() {
        assert_eq!(
            serde_json::to_string(&StationStatus::InService).unwrap(),
            "\"in_service\""
        );
        assert_eq!(
            serde_json::to_string(&StationStatus::UnderConstruction).unwrap(),
            "\"under_construction\""
        );
        let status: StationStatus = serde_json::from_str("\"planned\"").unwrap();
        assert_eq!(status, StationStatus::Planned);
    }

    #[test]
    fn coordinate_serializes_as_pair() {
        let c = Coordinate(116.43, 39.92);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[116.43,39.92]");
        let back: Coordinate = serde_json::from_str("[116.43,39.92]").unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn station_defaults() {
        let station = Station::new(
            StationName::new("Dongzhimen").unwrap(),
            Coordinate(116.43, 39.94),
        );
        assert_eq!(station.id, "Dongzhimen");
        assert!(station.status.is_in_service());

        let planned = station
            .clone()
            .with_id("dzm")
            .with_status(StationStatus::Planned);
        assert_eq!(planned.id, "dzm");
        assert!(!planned.status.is_in_service());
    }
}
