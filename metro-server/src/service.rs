//! Snapshot host and mutation boundary.
//!
//! [`NetworkService`] owns the published `(network, graph, schedule)`
//! triple. Queries clone an `Arc` to the current snapshot and read it
//! without locking; edits build a complete replacement off to the side and
//! swap the pointer, so an in-flight query keeps its consistent graph even
//! across a concurrent republish. A moka cache fronts route queries; its
//! keys carry the model revision, so entries computed against a replaced
//! snapshot can never be served.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::domain::{
    DayType, Direction, Line, ModelError, Station, StationName, StationStatus, Timetable,
};
use crate::graph::RouteGraph;
use crate::network::Network;
use crate::planner::{
    FareTable, Itinerary, Planner, RouteError, RouteQuery, SearchConfig, SearchGoal,
};
use crate::schedule::ScheduleIndex;

/// One immutable published build of the network: the model plus everything
/// derived from it.
#[derive(Debug)]
pub struct Snapshot {
    pub network: Network,
    pub graph: RouteGraph,
    pub schedule: ScheduleIndex,
}

impl Snapshot {
    /// Derive the graph and schedule index from a model.
    pub fn build(network: Network) -> Snapshot {
        let graph = RouteGraph::build(&network);
        let schedule = ScheduleIndex::build(&network);
        Snapshot {
            network,
            graph,
            schedule,
        }
    }
}

/// Configuration for the itinerary cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached itineraries.
    pub ttl: Duration,

    /// Maximum number of cached itineraries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 10_000,
        }
    }
}

/// Cache key: model revision plus everything a query's answer depends on.
type RouteKey = (u64, StationName, StationName, u32, DayType, SearchGoal);

/// The service boundary between the editing side and the query side.
pub struct NetworkService {
    snapshot: RwLock<Arc<Snapshot>>,
    /// Serializes mutations so concurrent edits never build from the same
    /// parent model.
    edits: Mutex<()>,
    routes: MokaCache<RouteKey, Arc<Itinerary>>,
    search_config: SearchConfig,
    fares: FareTable,
}

impl NetworkService {
    /// Build the initial snapshot and an empty cache.
    pub fn new(
        network: Network,
        search_config: SearchConfig,
        fares: FareTable,
        cache_config: &CacheConfig,
    ) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(cache_config.ttl)
            .max_capacity(cache_config.max_capacity)
            .build();
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::build(network))),
            edits: Mutex::new(()),
            routes,
            search_config,
            fares,
        }
    }

    /// A service with default search, fare, and cache configuration.
    pub fn with_defaults(network: Network) -> Self {
        Self::new(
            network,
            SearchConfig::default(),
            FareTable::default(),
            &CacheConfig::default(),
        )
    }

    /// The current published snapshot.
    ///
    /// The handle stays valid and consistent for as long as the caller
    /// keeps it, regardless of concurrent edits.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Apply a mutation to a copy of the model and republish on success.
    ///
    /// The rebuild happens before the write lock is taken, and the lock is
    /// held only for the pointer swap. A rejected mutation leaves the
    /// published snapshot untouched.
    pub async fn update<F>(&self, mutate: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut Network) -> Result<(), ModelError>,
    {
        let _edit = self.edits.lock().await;

        let mut network = self.snapshot().await.network.clone();
        mutate(&mut network)?;
        let revision = network.revision();
        let next = Arc::new(Snapshot::build(network));

        *self.snapshot.write().await = next;
        self.routes.invalidate_all();
        info!(revision, "published network snapshot");
        Ok(())
    }

    pub async fn add_station(&self, station: Station) -> Result<(), ModelError> {
        self.update(|network| network.add_station(station)).await
    }

    pub async fn remove_station(&self, name: &str) -> Result<(), ModelError> {
        self.update(|network| network.remove_station(name)).await
    }

    pub async fn set_station_status(
        &self,
        name: &str,
        status: StationStatus,
    ) -> Result<(), ModelError> {
        self.update(|network| network.set_station_status(name, status))
            .await
    }

    pub async fn add_line(&self, line: Line) -> Result<(), ModelError> {
        self.update(|network| network.add_line(line)).await
    }

    pub async fn remove_line(&self, name: &str) -> Result<(), ModelError> {
        self.update(|network| network.remove_line(name)).await
    }

    pub async fn set_timetable(
        &self,
        line: &str,
        day: DayType,
        direction: Direction,
        table: Timetable,
    ) -> Result<(), ModelError> {
        self.update(|network| network.set_timetable(line, day, direction, table))
            .await
    }

    /// Cache-fronted route query.
    ///
    /// Endpoint names are validated against the model before anything else,
    /// and an origin equal to its destination short-circuits to the empty
    /// itinerary. Only successful results enter the cache.
    pub async fn find_route(&self, query: RouteQuery) -> Result<Arc<Itinerary>, RouteError> {
        let snapshot = self.snapshot().await;
        if snapshot.network.station(query.origin.as_str()).is_none() {
            return Err(RouteError::InvalidStation(
                query.origin.as_str().to_string(),
            ));
        }
        if snapshot.network.station(query.destination.as_str()).is_none() {
            return Err(RouteError::InvalidStation(
                query.destination.as_str().to_string(),
            ));
        }
        if query.origin == query.destination {
            return Ok(Arc::new(Itinerary::empty(
                query.origin.clone(),
                query.departure,
            )));
        }

        let key = (
            snapshot.network.revision(),
            query.origin.clone(),
            query.destination.clone(),
            query.departure.secs(),
            query.day,
            query.goal,
        );
        if let Some(hit) = self.routes.get(&key).await {
            debug!(
                origin = %query.origin,
                destination = %query.destination,
                "itinerary served from cache"
            );
            return Ok(hit);
        }

        let planner = Planner::new(&snapshot.graph, &snapshot.schedule, &self.search_config);
        let rides = planner.search(&query)?;
        let itinerary = Arc::new(Itinerary::assemble(&query, &rides, &self.fares));
        self.routes.insert(key, itinerary.clone()).await;
        Ok(itinerary)
    }

    /// Look up one station by name.
    pub async fn find_station(&self, name: &str) -> Option<Station> {
        self.snapshot().await.network.station(name).cloned()
    }

    /// Case-insensitive substring search over station names.
    pub async fn search_stations(&self, needle: &str) -> Vec<Station> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.snapshot()
            .await
            .network
            .stations()
            .into_iter()
            .filter(|s| s.name.as_str().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// All stations, sorted by name.
    pub async fn stations(&self) -> Vec<Station> {
        self.snapshot()
            .await
            .network
            .stations()
            .into_iter()
            .cloned()
            .collect()
    }

    /// All lines, sorted by name.
    pub async fn lines(&self) -> Vec<Line> {
        self.snapshot()
            .await
            .network
            .lines()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Number of cached itineraries, for monitoring.
    pub fn cached_route_count(&self) -> u64 {
        self.routes.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{Coordinate, LineName, TimeOfDay};

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn station_name(s: &str) -> StationName {
        StationName::new(s).unwrap()
    }

    fn table(rows: &[(u8, &[u8])]) -> Timetable {
        let rows: BTreeMap<u8, Vec<u8>> = rows.iter().map(|&(h, ms)| (h, ms.to_vec())).collect();
        Timetable::new(rows).unwrap()
    }

    fn sample_network() -> Network {
        let mut network = Network::new();
        for name in ["X", "Y", "Z"] {
            network
                .add_station(Station::new(station_name(name), Coordinate(0.0, 0.0)))
                .unwrap();
        }
        let mut line = Line::new(
            LineName::new("A").unwrap(),
            ["X", "Y", "Z"].iter().map(|s| station_name(s)).collect(),
            vec![1000, 1500],
            40.0,
        )
        .unwrap();
        line.set_table(
            DayType::Workday,
            Direction::Outbound,
            table(&[(8, &[0, 10, 20])]),
        );
        network.add_line(line).unwrap();
        network
    }

    fn service() -> NetworkService {
        NetworkService::with_defaults(sample_network())
    }

    fn query(origin: &str, destination: &str, departure: &str) -> RouteQuery {
        RouteQuery::new(
            station_name(origin),
            station_name(destination),
            t(departure),
            DayType::Workday,
        )
    }

    #[tokio::test]
    async fn finds_and_caches_a_route() {
        let service = service();

        let first = service.find_route(query("X", "Z", "08:03")).await.unwrap();
        assert_eq!(first.arrival, t("08:13:45"));
        assert_eq!(first.total_secs, 645);
        assert_eq!(first.transfer_count(), 0);
        assert_eq!(first.fare_yuan, 3);

        let second = service.find_route(query("X", "Z", "08:03")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn cache_count_tracks_stored_itineraries() {
        let service = service();
        assert_eq!(service.cached_route_count(), 0);

        service.find_route(query("X", "Z", "08:03")).await.unwrap();
        service.routes.run_pending_tasks().await;
        assert_eq!(service.cached_route_count(), 1);

        // Failed queries stay out of the cache.
        let err = service.find_route(query("X", "Z", "23:59")).await;
        assert!(err.is_err());
        service.routes.run_pending_tasks().await;
        assert_eq!(service.cached_route_count(), 1);

        // So does the trivial same-station itinerary.
        service.find_route(query("X", "X", "08:03")).await.unwrap();
        service.routes.run_pending_tasks().await;
        assert_eq!(service.cached_route_count(), 1);
    }

    #[tokio::test]
    async fn origin_equal_destination_is_free() {
        let service = service();
        let itinerary = service.find_route(query("X", "X", "08:03")).await.unwrap();
        assert!(itinerary.is_empty());
        assert_eq!(itinerary.fare_yuan, 0);
        assert_eq!(itinerary.total_secs, 0);
    }

    #[tokio::test]
    async fn unknown_station_is_rejected_by_name() {
        let service = service();
        let err = service.find_route(query("X", "Nowhere", "08:03")).await.unwrap_err();
        assert_eq!(err, RouteError::InvalidStation("Nowhere".to_string()));
    }

    #[tokio::test]
    async fn edits_invalidate_cached_routes() {
        let service = service();

        let before = service.find_route(query("X", "Z", "08:03")).await.unwrap();
        assert_eq!(before.departure, t("08:10"));

        // Drop the 08:10 departure; the same query must now board at 08:20.
        service
            .set_timetable(
                "A",
                DayType::Workday,
                Direction::Outbound,
                table(&[(8, &[0, 20])]),
            )
            .await
            .unwrap();

        let after = service.find_route(query("X", "Z", "08:03")).await.unwrap();
        assert_eq!(after.departure, t("08:20"));
        assert_eq!(after.arrival, t("08:23:45"));
    }

    #[tokio::test]
    async fn rejected_edit_leaves_the_snapshot_untouched() {
        let service = service();
        let before = service.snapshot().await;

        let err = service
            .add_line(
                Line::new(
                    LineName::new("B").unwrap(),
                    vec![station_name("X"), station_name("Ghost")],
                    vec![1000],
                    40.0,
                )
                .unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidStation(_)));

        let after = service.snapshot().await;
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.network.revision(), before.network.revision());
    }

    #[tokio::test]
    async fn old_snapshot_handles_survive_edits() {
        let service = service();
        let held = service.snapshot().await;

        service.remove_line("A").await.unwrap();

        // The held snapshot still routes; the published one no longer can.
        assert!(held.network.line("A").is_some());
        let config = SearchConfig::default();
        let planner = Planner::new(&held.graph, &held.schedule, &config);
        assert!(planner.search(&query("X", "Z", "08:03")).is_ok());

        let err = service.find_route(query("X", "Z", "08:03")).await.unwrap_err();
        assert!(matches!(err, RouteError::NoPathFound { .. }));
    }

    #[tokio::test]
    async fn station_mutations_cascade() {
        let service = service();

        service.remove_station("Y").await.unwrap();
        let stations = service.stations().await;
        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["X", "Z"]);

        // The line bridges the gap: X to Z is still one ride.
        let itinerary = service.find_route(query("X", "Z", "08:03")).await.unwrap();
        assert_eq!(itinerary.legs.len(), 1);
        assert_eq!(itinerary.total_distance_m, 2500);
    }

    #[tokio::test]
    async fn search_stations_matches_substrings() {
        let mut network = sample_network();
        network
            .add_station(Station::new(
                station_name("Xizhimen"),
                Coordinate(116.35, 39.94),
            ))
            .unwrap();
        let service = NetworkService::with_defaults(network);

        let hits = service.search_stations("xiz").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name.as_str(), "Xizhimen");

        let all_x = service.search_stations("X").await;
        assert_eq!(all_x.len(), 2);

        assert!(service.search_stations("   ").await.is_empty());
    }
}
