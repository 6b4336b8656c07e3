//! HTTP surface of the dispatch-queue service, built on axum.
//!
//! Identity arrives pre-verified in forwarded headers (`x-professional-id`,
//! `x-display-name`, `x-role`); handlers pass it to the engine, which owns
//! every authorization and state-machine decision. Handlers are thin:
//! extract, delegate, wrap in the JSON envelope.

pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, trace_layer};
pub use routes::AppState;

/// Builds the full application router with tracing, CORS and request
/// logging layers.
pub fn create_app(state: AppState) -> Router {
    routes::create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
