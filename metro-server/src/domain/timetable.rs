//! Timetable tables and the day-type / direction lookup key.
//!
//! Every line carries four departure tables, one per (day-type, direction)
//! pair. A table lists the scheduled departure minutes from the line's
//! terminus, grouped by hour. The pair is always passed explicitly; nothing
//! in the engine infers which table applies from context.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::time::TimeOfDay;

/// Which calendar schedule a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Workday,
    RestDay,
}

impl DayType {
    /// Derive the day-type for a calendar date.
    ///
    /// Saturday and Sunday run the rest-day tables; every other weekday is
    /// a workday. Public holidays are not modelled.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_server::domain::DayType;
    /// use chrono::NaiveDate;
    ///
    /// let friday = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
    /// let saturday = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
    /// assert_eq!(DayType::for_date(friday), DayType::Workday);
    /// assert_eq!(DayType::for_date(saturday), DayType::RestDay);
    /// ```
    pub fn for_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::RestDay,
            _ => DayType::Workday,
        }
    }
}

/// Travel direction along a line's station sequence.
///
/// `Outbound` trains depart the first station of the sequence and read the
/// start-terminus tables; `Inbound` trains depart the last station and read
/// the end-terminus tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    /// Stable index for direction-keyed arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Outbound => 0,
            Direction::Inbound => 1,
        }
    }
}

/// One terminus departure table: scheduled departure minutes grouped by hour.
///
/// # Invariants
///
/// Hours are 0-23 and minutes 0-59, checked at construction; each hour's
/// minute list is sorted ascending and deduplicated, and empty hours are
/// dropped. Lookups rely on this, so raw rows only enter through
/// [`Timetable::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    hours: BTreeMap<u8, Vec<u8>>,
}

impl Timetable {
    /// Validate and normalize raw hour rows into a table.
    ///
    /// # Errors
    ///
    /// `ModelError::MalformedTimetable` if any hour is above 23 or any
    /// minute above 59.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use metro_server::domain::Timetable;
    ///
    /// let rows = BTreeMap::from([(8u8, vec![20u8, 0, 10])]);
    /// let table = Timetable::new(rows).unwrap();
    /// assert!(!table.is_empty());
    ///
    /// let bad = BTreeMap::from([(8u8, vec![60u8])]);
    /// assert!(Timetable::new(bad).is_err());
    /// ```
    pub fn new(rows: BTreeMap<u8, Vec<u8>>) -> Result<Self, ModelError> {
        let mut hours = BTreeMap::new();
        for (hour, mut minutes) in rows {
            if hour > 23 {
                return Err(ModelError::MalformedTimetable(format!(
                    "hour {hour} is out of range 0-23"
                )));
            }
            if let Some(&bad) = minutes.iter().find(|&&m| m > 59) {
                return Err(ModelError::MalformedTimetable(format!(
                    "minute {bad} in hour {hour} is out of range 0-59"
                )));
            }
            if minutes.is_empty() {
                continue;
            }
            minutes.sort_unstable();
            minutes.dedup();
            hours.insert(hour, minutes);
        }
        Ok(Self { hours })
    }

    /// A table with no departures at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if no departures are scheduled.
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Total number of scheduled departures.
    pub fn len(&self) -> usize {
        self.hours.values().map(Vec::len).sum()
    }

    /// First scheduled terminus departure at or after `not_before`.
    ///
    /// Scans hour buckets in ascending order; `None` once the table's last
    /// departure has passed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use metro_server::domain::{Timetable, TimeOfDay};
    ///
    /// let table = Timetable::new(BTreeMap::from([(8u8, vec![0u8, 10, 20])])).unwrap();
    /// let t = TimeOfDay::parse("08:03").unwrap();
    /// let next = table.first_departure_at_or_after(t).unwrap();
    /// assert_eq!(next.to_string(), "08:10:00");
    /// ```
    pub fn first_departure_at_or_after(&self, not_before: TimeOfDay) -> Option<TimeOfDay> {
        let start_hour = not_before.hour() as u8;
        for (&hour, minutes) in self.hours.range(start_hour..) {
            for &minute in minutes {
                let departure = TimeOfDay::from_hms(u32::from(hour), u32::from(minute), 0)?;
                if departure >= not_before {
                    return Some(departure);
                }
            }
        }
        None
    }

    /// All scheduled departures in chronological order.
    pub fn departures(&self) -> impl Iterator<Item = TimeOfDay> + '_ {
        self.hours.iter().flat_map(|(&hour, minutes)| {
            minutes
                .iter()
                .filter_map(move |&m| TimeOfDay::from_hms(u32::from(hour), u32::from(m), 0))
        })
    }
}

/// The four operating tables a line carries, keyed by day-type and direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableSet {
    tables: [[Timetable; 2]; 2],
}

impl TimetableSet {
    /// Look up the table for a (day-type, direction) pair.
    pub fn table(&self, day: DayType, direction: Direction) -> &Timetable {
        &self.tables[day_index(day)][direction.index()]
    }

    /// Replace the table for a (day-type, direction) pair.
    pub fn set(&mut self, day: DayType, direction: Direction, table: Timetable) {
        self.tables[day_index(day)][direction.index()] = table;
    }

    /// True if no table in the set has any departures.
    pub fn is_empty(&self) -> bool {
        self.tables
            .iter()
            .all(|row| row.iter().all(Timetable::is_empty))
    }
}

fn day_index(day: DayType) -> usize {
    match day {
        DayType::Workday => 0,
        DayType::RestDay => 1,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn raw_rows()(
            rows in proptest::collection::btree_map(0u8..24, proptest::collection::vec(0u8..60, 0..8), 0..6)
        ) -> BTreeMap<u8, Vec<u8>> {
            rows
        }
    }

    proptest! {
        /// In-range rows always construct, and every hour ends up sorted
        #[test]
        fn valid_rows_always_construct(rows in raw_rows()) {
            let table = Timetable::new(rows).unwrap();
            let departures: Vec<TimeOfDay> = table.departures().collect();
            let mut sorted = departures.clone();
            sorted.sort();
            prop_assert_eq!(departures, sorted);
        }

        /// The first departure found never precedes the bound
        #[test]
        fn found_departure_respects_bound(rows in raw_rows(), bound in 0u32..86_400) {
            let table = Timetable::new(rows).unwrap();
            let bound = TimeOfDay::from_secs(bound).unwrap();
            if let Some(found) = table.first_departure_at_or_after(bound) {
                prop_assert!(found >= bound);
            }
        }
    }
}
