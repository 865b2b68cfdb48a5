//! REST API for the GeoSim service
//!
//! axum routing, request-context middleware, the account extractor and
//! the handlers behind every endpoint. Response types carry schemars
//! annotations.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod state;
pub mod types;

pub use routing::create_router;
pub use state::AppState;
