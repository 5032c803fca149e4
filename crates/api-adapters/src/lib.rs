//! # api-adapters
//!
//! HTTP surface of the discovery service.
//!
//! Each discovery request runs three explicit stages over a
//! [`http::RequestContext`]: authenticate, rate limit, discover. A failing
//! stage short-circuits the rest.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod http;

pub use metrics::{DiscoverMetrics, Outcome};

#[cfg(feature = "web-axum")]
pub use http::{router, ApiError, AppState, ProxyTrust};
