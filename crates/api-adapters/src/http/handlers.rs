//! # Handlers
//!
//! This module coordinates the flow between HTTP requests and the discovery
//! service.

use super::context::{self, ClientIp};
use super::{ApiError, AppState};
use crate::metrics::Outcome;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use domains::{DiscoveryQuery, Post};
use services::request_parser::parse_sort;

/// `GET /posts/discover`
///
/// Parameters are read as raw pairs so that a repeated key keeps its first
/// value instead of failing the whole query. A query string that cannot be
/// decoded at all is treated as empty.
pub async fn discover(
    State(state): State<AppState>,
    client_ip: ClientIp,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let query = match query {
        Ok(Query(pairs)) => DiscoveryQuery::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!(%rejection, "undecodable discovery query, using defaults");
            DiscoveryQuery::default()
        }
    };
    let sort = parse_sort(query.sort.as_deref());

    let result = run_pipeline(&state, client_ip, &headers, &query).await;
    let outcome = match &result {
        Ok(_) => Outcome::Ok,
        Err(ApiError::Unauthorized(_)) => Outcome::Unauthorized,
        Err(ApiError::RateLimited { .. }) => Outcome::RateLimited,
        Err(ApiError::Internal(_)) => Outcome::Error,
    };
    state.metrics.record(sort, outcome);
    result.map(Json)
}

async fn run_pipeline(
    state: &AppState,
    client_ip: ClientIp,
    headers: &HeaderMap,
    query: &DiscoveryQuery,
) -> Result<Vec<Post>, ApiError> {
    let ctx = context::authenticate(state, headers, client_ip).await?;
    let ctx = context::rate_limit(state, ctx).await?;
    Ok(state.discovery.discover(&ctx.requester, query).await?)
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
