//! Itinerary assembly.
//!
//! Projects a finalized ride sequence into the rider-facing result:
//! consecutive rides on one line collapse into a leg, transfer stations are
//! the boundaries between legs, and the totals (elapsed time, distance,
//! fare) are deterministic sums. No searching happens here.

use crate::domain::{LineName, StationName, TimeOfDay};

use super::fare::FareTable;
use super::search::{Ride, RouteQuery};

/// One stretch ridden on a single line without leaving the train.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub line: LineName,
    pub from: StationName,
    pub to: StationName,
    /// Boarding instant at `from`.
    pub depart: TimeOfDay,
    /// Alighting instant at `to`.
    pub arrive: TimeOfDay,
    /// Stations traveled past, boarding station excluded.
    pub stops: u32,
    pub distance_m: u32,
}

/// The formatted result of a successful route query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    pub origin: StationName,
    pub destination: StationName,
    /// Instant the rider asked to leave; waits are measured from here.
    pub requested_departure: TimeOfDay,
    /// Instant the first train actually departs.
    pub departure: TimeOfDay,
    /// Final arrival instant.
    pub arrival: TimeOfDay,
    /// Every station visited, origin first.
    pub stations: Vec<StationName>,
    pub legs: Vec<Leg>,
    /// Stations where the rider changes lines, in order.
    pub transfers: Vec<StationName>,
    /// Elapsed seconds from the requested departure to final arrival.
    pub total_secs: u32,
    pub total_distance_m: u32,
    pub fare_yuan: u32,
}

impl Itinerary {
    /// The trivial itinerary for a query whose origin is its destination:
    /// no legs, zero elapsed, zero distance, zero fare.
    pub fn empty(station: StationName, requested: TimeOfDay) -> Self {
        Self {
            origin: station.clone(),
            destination: station.clone(),
            requested_departure: requested,
            departure: requested,
            arrival: requested,
            stations: vec![station],
            legs: Vec::new(),
            transfers: Vec::new(),
            total_secs: 0,
            total_distance_m: 0,
            fare_yuan: 0,
        }
    }

    /// Fold a finalized ride sequence into legs and totals.
    pub fn assemble(query: &RouteQuery, rides: &[Ride], fares: &FareTable) -> Self {
        let Some(first) = rides.first() else {
            return Self::empty(query.origin.clone(), query.departure);
        };

        let mut stations = vec![first.from.clone()];
        let mut legs: Vec<Leg> = Vec::new();
        let mut transfers = Vec::new();
        let mut total_distance_m = 0u32;

        for ride in rides {
            stations.push(ride.to.clone());
            total_distance_m += ride.distance_m;
            match legs.last_mut() {
                Some(leg) if leg.line == ride.line => {
                    leg.to = ride.to.clone();
                    leg.arrive = ride.arrive;
                    leg.stops += 1;
                    leg.distance_m += ride.distance_m;
                }
                _ => {
                    if !legs.is_empty() {
                        transfers.push(ride.from.clone());
                    }
                    legs.push(Leg {
                        line: ride.line.clone(),
                        from: ride.from.clone(),
                        to: ride.to.clone(),
                        depart: ride.depart,
                        arrive: ride.arrive,
                        stops: 1,
                        distance_m: ride.distance_m,
                    });
                }
            }
        }

        // Safe: rides checked non-empty above, so legs is too.
        let departure = legs.first().unwrap().depart;
        let arrival = legs.last().unwrap().arrive;

        Self {
            origin: query.origin.clone(),
            destination: query.destination.clone(),
            requested_departure: query.departure,
            departure,
            arrival,
            stations,
            legs,
            transfers,
            total_secs: arrival.secs() - query.departure.secs(),
            total_distance_m,
            fare_yuan: fares.price(total_distance_m),
        }
    }

    /// Number of line changes.
    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// True for the origin == destination result.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}
