use std::net::SocketAddr;
use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use metro_server::network::load::load_network;
use metro_server::service::NetworkService;
use metro_server::web::{AppState, create_router};

/// Workspace-relative defaults; override with METRO_DATA / METRO_ADDR.
const DEFAULT_DATA_FILE: &str = "metro-server/data/network.json";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const STATIC_DIR: &str = "metro-server/static";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("metro_server=debug")),
        )
        .init();

    let data_file = std::env::var("METRO_DATA").unwrap_or_else(|_| {
        warn!("METRO_DATA not set, using {DEFAULT_DATA_FILE}");
        DEFAULT_DATA_FILE.to_string()
    });

    let network = load_network(Path::new(&data_file)).expect("Failed to load network data");
    info!(
        stations = network.station_count(),
        lines = network.line_count(),
        "loaded network from {data_file}"
    );

    let service = NetworkService::with_defaults(network);
    let state = AppState::new(service);
    let app = create_router(state, STATIC_DIR);

    let addr: SocketAddr = std::env::var("METRO_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .expect("METRO_ADDR must be host:port");

    println!("Metro route server listening on http://{addr}");
    println!();
    println!("Open http://{addr} in your browser for the network map.");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health               - Health check");
    println!("  GET  /api/stations         - Stations as GeoJSON");
    println!("  GET  /api/stations/search  - Search stations by name");
    println!("  GET  /api/stations/:name   - Single station record");
    println!("  GET  /api/lines            - Line summaries");
    println!("  POST /api/route            - Plan a route");
    println!("  GET  /api/stats            - Service counters");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
