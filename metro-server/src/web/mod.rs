//! Web layer for the route query service.
//!
//! Provides HTTP endpoints for station lookups, line summaries, and route
//! planning, plus the static map page.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
