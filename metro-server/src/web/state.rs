//! Application state shared across requests.

use std::sync::Arc;

use crate::service::NetworkService;

/// Shared application state.
///
/// Cloned into every handler; the service itself lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NetworkService>,
}

impl AppState {
    pub fn new(service: NetworkService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
