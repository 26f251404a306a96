//! Timetable resolver.
//!
//! Timetables list departures from a line's terminus, but riders board at
//! interior stations. [`ScheduleIndex::build`] precomputes, per (line,
//! direction), the elapsed travel time from the terminus to every station on
//! the sequence, so [`ScheduleIndex::next_departure`] can answer "when does
//! the next train on this line reach this station" with one table scan.
//!
//! Offsets accumulate over the full station sequence, including stations
//! that are not in service: trains pass through them on schedule even though
//! riders cannot board there.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{DayType, Direction, LineName, StationName, TimeOfDay, TimetableSet};
use crate::network::Network;

/// One line's resolver data: terminus offsets per direction plus a copy of
/// its departure tables, so lookups need no access to the model.
#[derive(Debug, Clone)]
struct LineSchedule {
    offsets: [HashMap<StationName, u32>; 2],
    tables: TimetableSet,
}

/// Precomputed boarding-time resolver for one model snapshot.
#[derive(Debug, Default)]
pub struct ScheduleIndex {
    lines: HashMap<LineName, LineSchedule>,
}

impl ScheduleIndex {
    /// Precompute terminus offsets for every line in the network.
    pub fn build(network: &Network) -> ScheduleIndex {
        let mut lines = HashMap::new();

        for line in network.lines() {
            // No departures in any slot means nothing to resolve.
            if line.has_no_service() {
                continue;
            }
            let stations = line.stations();
            let travel: Vec<u32> = line.segments().map(|s| s.travel_secs).collect();

            let mut outbound = HashMap::with_capacity(stations.len());
            let mut acc = 0u32;
            for (i, station) in stations.iter().enumerate() {
                if i > 0 {
                    acc += travel[i - 1];
                }
                outbound.insert(station.clone(), acc);
            }

            let mut inbound = HashMap::with_capacity(stations.len());
            let mut acc = 0u32;
            for (i, station) in stations.iter().enumerate().rev() {
                if i + 1 < stations.len() {
                    acc += travel[i];
                }
                inbound.insert(station.clone(), acc);
            }

            lines.insert(
                line.name().clone(),
                LineSchedule {
                    offsets: [outbound, inbound],
                    tables: line.schedules().clone(),
                },
            );
        }

        let index = ScheduleIndex { lines };
        debug!(lines = index.lines.len(), "built schedule index");
        index
    }

    /// Travel seconds from `direction`'s terminus to `station` on `line`.
    pub fn offset(&self, line: &str, direction: Direction, station: &str) -> Option<u32> {
        self.lines
            .get(line)?
            .offsets[direction.index()]
            .get(station)
            .copied()
    }

    /// Earliest scheduled instant a train on `line` running in `direction`
    /// departs `station` at or after `not_before`.
    ///
    /// Scans the terminus table for the first departure `t` whose arrival at
    /// the station, `t + offset`, is at or after the bound. `None` once the
    /// day's service is exhausted, when `t + offset` would land past
    /// midnight, or when the line does not serve the station.
    pub fn next_departure(
        &self,
        line: &str,
        direction: Direction,
        station: &str,
        day: DayType,
        not_before: TimeOfDay,
    ) -> Option<TimeOfDay> {
        let schedule = self.lines.get(line)?;
        let offset = schedule.offsets[direction.index()].get(station).copied()?;

        let earliest_terminus =
            TimeOfDay::from_secs(not_before.secs().saturating_sub(offset))?;
        let terminus_departure = schedule
            .tables
            .table(day, direction)
            .first_departure_at_or_after(earliest_terminus)?;

        // None here means the train reaches the station past midnight; any
        // later departure would too.
        terminus_departure.plus_secs(offset)
    }
}
