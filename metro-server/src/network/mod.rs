//! The in-memory network model.
//!
//! Stations and lines keyed by name, plus the mutation entry points the
//! editing layer drives. Every mutation validates completely before touching
//! the maps, so a rejected edit leaves the model exactly as it was. A
//! station's line-set is always derived from the line definitions, never
//! stored separately.

use std::collections::HashMap;

use crate::domain::{
    DayType, Direction, Line, LineName, ModelError, Station, StationName, StationStatus,
    Timetable,
};

pub mod load;

/// The editable network model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    stations: HashMap<StationName, Station>,
    lines: HashMap<LineName, Line>,
    revision: u64,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic edit counter; bumps on every committed mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up a station by name.
    pub fn station(&self, name: &str) -> Option<&Station> {
        self.stations.get(name)
    }

    /// Look up a line by name.
    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.get(name)
    }

    /// All stations, sorted by name for deterministic listings.
    pub fn stations(&self) -> Vec<&Station> {
        let mut all: Vec<&Station> = self.stations.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// All lines, sorted by name for deterministic listings.
    pub fn lines(&self) -> Vec<&Line> {
        let mut all: Vec<&Line> = self.lines.values().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// The lines whose sequence contains `station`, sorted by name.
    pub fn lines_serving(&self, station: &str) -> Vec<&Line> {
        match self.stations.get(station) {
            None => Vec::new(),
            Some(found) => {
                let mut serving: Vec<&Line> = self
                    .lines
                    .values()
                    .filter(|line| line.serves(&found.name))
                    .collect();
                serving.sort_by(|a, b| a.name().cmp(b.name()));
                serving
            }
        }
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Add a new station.
    ///
    /// # Errors
    ///
    /// `ModelError::StationExists` if the name is already taken.
    pub fn add_station(&mut self, station: Station) -> Result<(), ModelError> {
        if self.stations.contains_key(station.name.as_str()) {
            return Err(ModelError::StationExists(station.name.as_str().to_string()));
        }
        self.stations.insert(station.name.clone(), station);
        self.committed();
        Ok(())
    }

    /// Change a station's operating status.
    pub fn set_station_status(
        &mut self,
        name: &str,
        status: StationStatus,
    ) -> Result<(), ModelError> {
        let station = self
            .stations
            .get_mut(name)
            .ok_or_else(|| ModelError::InvalidStation(name.to_string()))?;
        station.status = status;
        self.committed();
        Ok(())
    }

    /// Remove a station, cascading into every line that serves it.
    ///
    /// Each affected line has the station spliced out of its sequence
    /// ([`Line::without_station`]); if any of them would drop below two
    /// stations the whole removal is rejected and nothing changes.
    pub fn remove_station(&mut self, name: &str) -> Result<(), ModelError> {
        let station = self
            .stations
            .get(name)
            .ok_or_else(|| ModelError::InvalidStation(name.to_string()))?;
        let station_name = station.name.clone();

        // Validate every affected line before committing anything.
        let mut replacements: Vec<Line> = Vec::new();
        for line in self.lines.values() {
            if line.serves(&station_name) {
                replacements.push(line.without_station(&station_name)?);
            }
        }

        for line in replacements {
            self.lines.insert(line.name().clone(), line);
        }
        self.stations.remove(name);
        self.committed();
        Ok(())
    }

    /// Add a new line.
    ///
    /// The line's structural invariants are already guaranteed by
    /// [`Line::new`]; this checks that the name is free and that every
    /// station in the sequence exists in the model.
    pub fn add_line(&mut self, line: Line) -> Result<(), ModelError> {
        if self.lines.contains_key(line.name().as_str()) {
            return Err(ModelError::LineExists(line.name().as_str().to_string()));
        }
        for station in line.stations() {
            if !self.stations.contains_key(station.as_str()) {
                return Err(ModelError::InvalidStation(station.as_str().to_string()));
            }
        }
        self.lines.insert(line.name().clone(), line);
        self.committed();
        Ok(())
    }

    /// Remove a line and the timetables it carries.
    pub fn remove_line(&mut self, name: &str) -> Result<(), ModelError> {
        if self.lines.remove(name).is_none() {
            return Err(ModelError::InvalidLine(name.to_string()));
        }
        self.committed();
        Ok(())
    }

    /// Replace one of a line's four departure tables.
    pub fn set_timetable(
        &mut self,
        line: &str,
        day: DayType,
        direction: Direction,
        table: Timetable,
    ) -> Result<(), ModelError> {
        let line = self
            .lines
            .get_mut(line)
            .ok_or_else(|| ModelError::InvalidLine(line.to_string()))?;
        line.set_table(day, direction, table);
        self.committed();
        Ok(())
    }

    fn committed(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{Coordinate, StationStatus};

    fn station(name: &str) -> Station {
        Station::new(
            StationName::new(name).unwrap(),
            Coordinate(116.4, 39.9),
        )
    }

    fn line(name: &str, stations: &[&str], distances: &[u32]) -> Line {
        Line::new(
            LineName::new(name).unwrap(),
            stations
                .iter()
                .map(|s| StationName::new(s).unwrap())
                .collect(),
            distances.to_vec(),
            40.0,
        )
        .unwrap()
    }

    fn network(stations: &[&str], lines: &[(&str, &[&str], &[u32])]) -> Network {
        let mut network = Network::new();
        for name in stations {
            network.add_station(station(name)).unwrap();
        }
        for &(name, stops, distances) in lines {
            network.add_line(line(name, stops, distances)).unwrap();
        }
        network
    }

    #[test]
    fn add_station_rejects_duplicates() {
        let mut network = Network::new();
        network.add_station(station("X")).unwrap();
        assert_eq!(
            network.add_station(station("X")),
            Err(ModelError::StationExists("X".to_string()))
        );
        assert_eq!(network.station_count(), 1);
    }

    #[test]
    fn add_line_requires_known_stations() {
        let mut network = network(&["X", "Y"], &[]);
        let before = network.clone();

        let result = network.add_line(line("A", &["X", "Q"], &[1000]));
        assert_eq!(result, Err(ModelError::InvalidStation("Q".to_string())));
        assert_eq!(network, before);
    }

    #[test]
    fn add_line_rejects_duplicate_names() {
        let mut network = network(&["X", "Y"], &[("A", &["X", "Y"], &[1000])]);
        assert_eq!(
            network.add_line(line("A", &["X", "Y"], &[1000])),
            Err(ModelError::LineExists("A".to_string()))
        );
    }

    #[test]
    fn lines_serving_is_derived_from_sequences() {
        let network = network(
            &["X", "Y", "Z"],
            &[
                ("A", &["X", "Y"], &[1000]),
                ("B", &["Y", "Z"], &[1500]),
            ],
        );
        let at_y: Vec<&str> = network
            .lines_serving("Y")
            .iter()
            .map(|l| l.name().as_str())
            .collect();
        assert_eq!(at_y, ["A", "B"]);
        assert_eq!(network.lines_serving("X").len(), 1);
        assert!(network.lines_serving("missing").is_empty());
    }

    #[test]
    fn remove_station_cascades_into_lines() {
        let mut network = network(
            &["W", "X", "Y", "Z"],
            &[("A", &["W", "X", "Y", "Z"], &[1000, 1500, 2000])],
        );
        network.remove_station("X").unwrap();

        assert!(network.station("X").is_none());
        let line = network.line("A").unwrap();
        assert_eq!(line.stations().len(), 3);
        assert_eq!(line.distances_m(), &[2500, 2000]);
    }

    #[test]
    fn remove_station_rejected_when_a_line_would_collapse() {
        let mut network = network(
            &["X", "Y", "Z"],
            &[
                ("A", &["X", "Y", "Z"], &[1000, 1500]),
                ("B", &["X", "Y"], &[800]),
            ],
        );
        let before = network.clone();

        // Line A tolerates losing Y, line B does not; nothing may change.
        let result = network.remove_station("Y");
        assert!(matches!(
            result,
            Err(ModelError::MalformedLineDefinition(_))
        ));
        assert_eq!(network, before);
    }

    #[test]
    fn remove_missing_station_is_invalid() {
        let mut network = Network::new();
        assert_eq!(
            network.remove_station("X"),
            Err(ModelError::InvalidStation("X".to_string()))
        );
    }

    #[test]
    fn remove_line_drops_its_timetables() {
        let mut network = network(&["X", "Y"], &[("A", &["X", "Y"], &[1000])]);
        let table = Timetable::new(BTreeMap::from([(8u8, vec![0u8])])).unwrap();
        network
            .set_timetable("A", DayType::Workday, Direction::Outbound, table)
            .unwrap();

        network.remove_line("A").unwrap();
        assert!(network.line("A").is_none());
        assert_eq!(
            network.remove_line("A"),
            Err(ModelError::InvalidLine("A".to_string()))
        );
    }

    #[test]
    fn set_timetable_requires_known_line() {
        let mut network = Network::new();
        assert_eq!(
            network.set_timetable(
                "A",
                DayType::Workday,
                Direction::Outbound,
                Timetable::empty()
            ),
            Err(ModelError::InvalidLine("A".to_string()))
        );
    }

    #[test]
    fn set_station_status_updates_in_place() {
        let mut network = network(&["X"], &[]);
        network
            .set_station_status("X", StationStatus::UnderConstruction)
            .unwrap();
        assert_eq!(
            network.station("X").unwrap().status,
            StationStatus::UnderConstruction
        );
    }

    #[test]
    fn revision_bumps_only_on_commit() {
        let mut network = Network::new();
        assert_eq!(network.revision(), 0);
        network.add_station(station("X")).unwrap();
        assert_eq!(network.revision(), 1);

        let _ = network.add_station(station("X"));
        assert_eq!(network.revision(), 1);

        network.add_station(station("Y")).unwrap();
        network.add_line(line("A", &["X", "Y"], &[1000])).unwrap();
        assert_eq!(network.revision(), 3);
    }

    #[test]
    fn listings_are_sorted() {
        let network = network(
            &["Zebra", "Alpha", "Mid"],
            &[("B", &["Zebra", "Mid"], &[500]), ("A", &["Alpha", "Mid"], &[700])],
        );
        let stations: Vec<&str> = network
            .stations()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(stations, ["Alpha", "Mid", "Zebra"]);

        let lines: Vec<&str> = network.lines().iter().map(|l| l.name().as_str()).collect();
        assert_eq!(lines, ["A", "B"]);
    }
}
