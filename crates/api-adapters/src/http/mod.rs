//! # HTTP (axum)
//!
//! Routes:
//!
//! - `GET /posts/discover` and its alias `GET /discover`
//! - `GET /health`
//! - `GET /metrics`

mod context;
mod error;
mod handlers;

pub use context::{bearer_token, ClientIp, ProxyTrust, RequestContext};
pub use error::ApiError;

use crate::metrics::DiscoverMetrics;
use axum::extract::FromRef;
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use domains::Authenticator;
use services::{DiscoveryService, RateLimitGate};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<DiscoveryService>,
    pub authenticator: Arc<dyn Authenticator>,
    pub rate_limit: Arc<RateLimitGate>,
    pub metrics: Arc<DiscoverMetrics>,
    pub proxy: ProxyTrust,
}

impl FromRef<AppState> for ProxyTrust {
    fn from_ref(state: &AppState) -> Self {
        state.proxy
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/posts/discover", get(handlers::discover))
        .route("/discover", get(handlers::discover))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}
