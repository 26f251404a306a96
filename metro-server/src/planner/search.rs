//! Time-dependent route search.
//!
//! Edge costs are not static: the wait before boarding depends on the
//! instant the rider reaches the station, so the search explores
//! `(station, line)` labels with a priority queue, resolving each boarding
//! against the timetable as it relaxes the edge. All cost components are
//! non-negative, which keeps the Dijkstra argument valid: the first time a
//! destination label leaves the frontier, its key is final.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DayType, LineName, StationName, TimeOfDay};
use crate::graph::{RideEdge, RouteGraph};
use crate::schedule::ScheduleIndex;

use super::config::SearchConfig;

/// Error from a route query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Station name not present in the network model
    #[error("station {0} is not in the network")]
    InvalidStation(String),

    /// Every viable boarding falls after the day's last departure
    #[error("no service from {origin} to {destination} at the requested time")]
    NoServiceAtRequestedTime { origin: String, destination: String },

    /// No route exists; also covers endpoints excluded from the active graph
    #[error("no path from {origin} to {destination}")]
    NoPathFound { origin: String, destination: String },

    /// Endpoints sit on parts of the network no sequence of lines joins
    #[error("{origin} and {destination} are on disconnected parts of the network")]
    DisconnectedNetwork { origin: String, destination: String },
}

/// What the search minimizes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchGoal {
    /// Least elapsed time, ties broken by fewer transfers.
    #[default]
    FastestTime,
    /// Fewest transfers, ties broken by least elapsed time.
    FewestTransfers,
}

/// One route request against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuery {
    /// Boarding station.
    pub origin: StationName,

    /// Alighting station.
    pub destination: StationName,

    /// Instant the rider is ready to depart; elapsed time is measured from
    /// here, so the wait for the first train counts.
    pub departure: TimeOfDay,

    /// Which timetable tables apply.
    pub day: DayType,

    /// Optimization goal.
    pub goal: SearchGoal,
}

impl RouteQuery {
    /// Create a query with the default goal.
    pub fn new(
        origin: StationName,
        destination: StationName,
        departure: TimeOfDay,
        day: DayType,
    ) -> Self {
        Self {
            origin,
            destination,
            departure,
            day,
            goal: SearchGoal::default(),
        }
    }

    /// Replace the optimization goal.
    pub fn with_goal(mut self, goal: SearchGoal) -> Self {
        self.goal = goal;
        self
    }
}

/// One traversed ride edge with its resolved instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    pub line: LineName,
    pub from: StationName,
    pub to: StationName,
    /// Instant the train leaves `from`.
    pub depart: TimeOfDay,
    /// Instant the train reaches `to`.
    pub arrive: TimeOfDay,
    pub distance_m: u32,
}

/// Where the rider stands and which line they are currently riding; the
/// unit of dominance pruning.
type Label = (StationName, Option<LineName>);

/// Priority key: `(elapsed, transfers)` or `(transfers, elapsed)` per goal.
type Key = (u32, u32);

#[derive(Debug)]
struct State {
    station: StationName,
    line: Option<LineName>,
    arrival: TimeOfDay,
    transfers: u32,
    parent: Option<usize>,
    /// Edge taken to reach this state; `None` only for the origin.
    ride: Option<Ride>,
}

/// Route planner over one immutable snapshot.
pub struct Planner<'a> {
    graph: &'a RouteGraph,
    schedule: &'a ScheduleIndex,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a planner borrowing a snapshot's graph and schedule.
    pub fn new(graph: &'a RouteGraph, schedule: &'a ScheduleIndex, config: &'a SearchConfig) -> Self {
        Self {
            graph,
            schedule,
            config,
        }
    }

    /// Find the best ride sequence for a query.
    ///
    /// Returns the traversed edges in order with resolved instants; an
    /// origin equal to the destination yields an empty sequence. Endpoint
    /// names must already be validated against the model; a name that is
    /// valid there but absent from the graph (status-excluded) fails with
    /// `NoPathFound`.
    pub fn search(&self, query: &RouteQuery) -> Result<Vec<Ride>, RouteError> {
        let origin = query.origin.as_str();
        let destination = query.destination.as_str();

        if !self.graph.contains(origin) || !self.graph.contains(destination) {
            return Err(RouteError::NoPathFound {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }
        if !self.graph.same_component(origin, destination) {
            return Err(RouteError::DisconnectedNetwork {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }

        let mut states: Vec<State> = Vec::new();
        let mut heap: BinaryHeap<Reverse<(u32, u32, u64, usize)>> = BinaryHeap::new();
        let mut best: HashMap<Label, Key> = HashMap::new();
        let mut seq = 0u64;
        let mut settled = 0usize;

        states.push(State {
            station: query.origin.clone(),
            line: None,
            arrival: query.departure,
            transfers: 0,
            parent: None,
            ride: None,
        });
        let start = key(query.goal, query.departure, query.departure, 0);
        best.insert((query.origin.clone(), None), start);
        heap.push(Reverse((start.0, start.1, seq, 0)));

        while let Some(Reverse((k0, k1, _, idx))) = heap.pop() {
            let (station, line, arrival, transfers) = {
                let state = &states[idx];
                (
                    state.station.clone(),
                    state.line.clone(),
                    state.arrival,
                    state.transfers,
                )
            };
            // A better push for the same label supersedes this entry.
            if best.get(&(station.clone(), line.clone())) != Some(&(k0, k1)) {
                continue;
            }
            settled += 1;

            if station == query.destination {
                let rides = collect_rides(&states, idx);
                debug!(
                    origin,
                    destination,
                    settled,
                    rides = rides.len(),
                    transfers,
                    "route search finished"
                );
                return Ok(rides);
            }

            for edge in self.graph.edges_from(station.as_str()) {
                let relaxed = if line.as_ref() == Some(&edge.line) {
                    // Still aboard; the train rolls straight through.
                    arrival
                        .plus_secs(edge.travel_secs)
                        .map(|arrive| (arrival, arrive, transfers))
                } else {
                    self.board(&station, line.as_ref(), edge, arrival, transfers, query.day)
                };
                let Some((depart, arrive, new_transfers)) = relaxed else {
                    continue;
                };

                let next_key = key(query.goal, query.departure, arrive, new_transfers);
                let label = (edge.to.clone(), Some(edge.line.clone()));
                if best.get(&label).is_some_and(|&k| k <= next_key) {
                    continue;
                }
                best.insert(label, next_key);

                states.push(State {
                    station: edge.to.clone(),
                    line: Some(edge.line.clone()),
                    arrival: arrive,
                    transfers: new_transfers,
                    parent: Some(idx),
                    ride: Some(Ride {
                        line: edge.line.clone(),
                        from: station.clone(),
                        to: edge.to.clone(),
                        depart,
                        arrive,
                        distance_m: edge.distance_m,
                    }),
                });
                seq += 1;
                heap.push(Reverse((next_key.0, next_key.1, seq, states.len() - 1)));
            }
        }

        // Structurally connected, so exhaustion means the timetables ran
        // out, not the track.
        debug!(origin, destination, settled, "frontier exhausted");
        Err(RouteError::NoServiceAtRequestedTime {
            origin: origin.to_string(),
            destination: destination.to_string(),
        })
    }

    /// Resolve boarding `edge` at `station`: cross the transfer edge when
    /// changing lines, then wait for the next scheduled train. `None` when
    /// the edge is unusable at this instant.
    fn board(
        &self,
        station: &StationName,
        line: Option<&LineName>,
        edge: &RideEdge,
        arrival: TimeOfDay,
        transfers: u32,
        day: DayType,
    ) -> Option<(TimeOfDay, TimeOfDay, u32)> {
        let ready = match line {
            Some(current) => {
                self.graph.transfer(station.as_str(), current, &edge.line)?;
                arrival.plus_secs(self.config.transfer_secs())?
            }
            None => arrival,
        };
        let depart = self.schedule.next_departure(
            edge.line.as_str(),
            edge.direction,
            station.as_str(),
            day,
            ready,
        )?;
        let arrive = depart.plus_secs(edge.travel_secs)?;
        let new_transfers = transfers + u32::from(line.is_some());
        Some((depart, arrive, new_transfers))
    }
}

fn key(goal: SearchGoal, requested: TimeOfDay, arrival: TimeOfDay, transfers: u32) -> Key {
    let elapsed = arrival.secs() - requested.secs();
    match goal {
        SearchGoal::FastestTime => (elapsed, transfers),
        SearchGoal::FewestTransfers => (transfers, elapsed),
    }
}

fn collect_rides(states: &[State], mut idx: usize) -> Vec<Ride> {
    let mut rides = Vec::new();
    loop {
        let state = &states[idx];
        if let Some(ride) = &state.ride {
            rides.push(ride.clone());
        }
        match state.parent {
            Some(parent) => idx = parent,
            None => break,
        }
    }
    rides.reverse();
    rides
}
