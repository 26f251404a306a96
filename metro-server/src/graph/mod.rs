//! Derived routing graph.
//!
//! [`RouteGraph::build`] compiles the network model into the structure the
//! search runs on: one directed ride edge per adjacent boardable station
//! pair per line, transfer pairs at stations served by more than one line,
//! and a connected-component label per node. The graph is a value; edits to
//! the model produce a fresh one rather than patching in place.
//!
//! Stations that are not in service are bridged, not severed: trains still
//! traverse their track (distance and travel time accumulate into a single
//! longer edge between the nearest in-service neighbors), but riders cannot
//! board, alight, or transfer there, and the station is absent from the
//! node set.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::domain::{Direction, LineName, StationName};
use crate::network::Network;

/// A directed ride along one line between two consecutive boardable stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideEdge {
    pub to: StationName,
    pub line: LineName,
    pub direction: Direction,
    pub distance_m: u32,
    pub travel_secs: u32,
}

/// A zero-distance line change available at a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEdge {
    pub from_line: LineName,
    pub to_line: LineName,
}

/// Immutable routing graph compiled from one model snapshot.
#[derive(Debug, Default)]
pub struct RouteGraph {
    edges: HashMap<StationName, Vec<RideEdge>>,
    lines_at: HashMap<StationName, Vec<LineName>>,
    transfers: HashMap<StationName, Vec<TransferEdge>>,
    components: HashMap<StationName, u32>,
    component_count: u32,
}

impl RouteGraph {
    /// Compile the model into a routing graph.
    pub fn build(network: &Network) -> RouteGraph {
        let mut edges: HashMap<StationName, Vec<RideEdge>> = HashMap::new();
        let mut lines_at: HashMap<StationName, Vec<LineName>> = HashMap::new();

        for line in network.lines() {
            let segments: Vec<_> = line.segments().collect();
            let mut previous: Option<StationName> = None;
            let mut acc_distance = 0u32;
            let mut acc_secs = 0u32;

            for (i, station) in line.stations().iter().enumerate() {
                if i > 0 {
                    let segment = &segments[i - 1];
                    acc_distance += segment.distance_m;
                    acc_secs += segment.travel_secs;
                }

                let boardable = network
                    .station(station.as_str())
                    .is_some_and(|s| s.status.is_in_service());
                if !boardable {
                    continue;
                }

                if let Some(ref prev) = previous {
                    if acc_distance > 0 {
                        edges.entry(prev.clone()).or_default().push(RideEdge {
                            to: station.clone(),
                            line: line.name().clone(),
                            direction: Direction::Outbound,
                            distance_m: acc_distance,
                            travel_secs: acc_secs,
                        });
                        edges.entry(station.clone()).or_default().push(RideEdge {
                            to: prev.clone(),
                            line: line.name().clone(),
                            direction: Direction::Inbound,
                            distance_m: acc_distance,
                            travel_secs: acc_secs,
                        });
                    }
                }

                lines_at
                    .entry(station.clone())
                    .or_default()
                    .push(line.name().clone());
                previous = Some(station.clone());
                acc_distance = 0;
                acc_secs = 0;
            }
        }

        for lines in lines_at.values_mut() {
            lines.sort();
            lines.dedup();
        }

        let mut transfers: HashMap<StationName, Vec<TransferEdge>> = HashMap::new();
        for (station, lines) in &lines_at {
            if lines.len() < 2 {
                continue;
            }
            let mut pairs = Vec::with_capacity(lines.len() * (lines.len() - 1));
            for from_line in lines {
                for to_line in lines {
                    if from_line != to_line {
                        pairs.push(TransferEdge {
                            from_line: from_line.clone(),
                            to_line: to_line.clone(),
                        });
                    }
                }
            }
            transfers.insert(station.clone(), pairs);
        }

        let (components, component_count) = label_components(&lines_at, &edges);

        let graph = RouteGraph {
            edges,
            lines_at,
            transfers,
            components,
            component_count,
        };
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            components = graph.component_count,
            "built routing graph"
        );
        graph
    }

    /// True if the station is a boardable node.
    pub fn contains(&self, station: &str) -> bool {
        self.lines_at.contains_key(station)
    }

    /// Ride edges leaving a station.
    pub fn edges_from(&self, station: &str) -> &[RideEdge] {
        self.edges.get(station).map_or(&[], Vec::as_slice)
    }

    /// Lines boardable at a station, sorted by name.
    pub fn lines_at(&self, station: &str) -> &[LineName] {
        self.lines_at.get(station).map_or(&[], Vec::as_slice)
    }

    /// Transfer edges available at a station.
    pub fn transfers_at(&self, station: &str) -> &[TransferEdge] {
        self.transfers.get(station).map_or(&[], Vec::as_slice)
    }

    /// The transfer edge from one line to another at a station, if the pair
    /// is boardable there.
    pub fn transfer(&self, station: &str, from: &LineName, to: &LineName) -> Option<&TransferEdge> {
        self.transfers_at(station)
            .iter()
            .find(|t| t.from_line == *from && t.to_line == *to)
    }

    /// Connected-component label of a station, if it is a node.
    pub fn component(&self, station: &str) -> Option<u32> {
        self.components.get(station).copied()
    }

    /// True if both stations are nodes in the same connected component.
    pub fn same_component(&self, a: &str, b: &str) -> bool {
        match (self.component(a), self.component(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.lines_at.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

/// Breadth-first component labelling over the undirected ride adjacency.
///
/// Nodes are visited in sorted order so labels are deterministic for a
/// given model.
fn label_components(
    nodes: &HashMap<StationName, Vec<LineName>>,
    edges: &HashMap<StationName, Vec<RideEdge>>,
) -> (HashMap<StationName, u32>, u32) {
    let mut components = HashMap::with_capacity(nodes.len());
    let mut ordered: Vec<&StationName> = nodes.keys().collect();
    ordered.sort();

    let mut next = 0u32;
    for start in ordered {
        if components.contains_key(start) {
            continue;
        }
        let label = next;
        next += 1;

        let mut queue = VecDeque::from([start.clone()]);
        components.insert(start.clone(), label);
        while let Some(station) = queue.pop_front() {
            for edge in edges.get(&station).map_or(&[][..], Vec::as_slice) {
                if !components.contains_key(&edge.to) {
                    components.insert(edge.to.clone(), label);
                    queue.push_back(edge.to.clone());
                }
            }
        }
    }

    (components, next)
}
