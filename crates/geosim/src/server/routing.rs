//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use crate::server::handlers::{dashboard, logs, public, simulate, simulations, status, templates, users};
use crate::server::{middleware::request_context, state::AppState};

/// Create the application router with the request-context middleware applied
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/logs", get(logs::get_logs))
    // Submission and owner-scoped records
    .route("/simulate", post(simulate::simulate))
    .route("/simulations", get(simulations::list))
    .route(
      "/simulations/{id}",
      get(simulations::get).patch(simulations::update_visibility).delete(simulations::delete),
    )
    .route("/dashboard", get(dashboard::dashboard))
    // Knowledge hub
    .route("/public/simulations", get(public::list))
    .route("/public/simulations/{id}", get(public::get))
    .route("/users/{id}", get(users::get))
    // Form presets
    .route("/templates", get(templates::list))
    .route("/templates/{key}", get(templates::get))
    .layer(middleware::from_fn_with_state(state.clone(), request_context))
    .with_state(state)
}
