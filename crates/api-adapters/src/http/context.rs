//! Per-request context and the stages that build it.

use super::{ApiError, AppState};
use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use domains::Requester;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Whether the `X-Forwarded-For` header may name the client. Only enable
/// this behind a reverse proxy that overwrites the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyTrust {
    pub trust_forwarded_for: bool,
}

/// Client address: the socket peer, or the first `X-Forwarded-For` hop when
/// the proxy is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    ProxyTrust: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if ProxyTrust::from_ref(state).trust_forwarded_for {
            let forwarded = parts
                .headers
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty());
            if let Some(ip) = forwarded {
                return Ok(ClientIp(ip.to_string()));
            }
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientIp(peer))
    }
}

/// Extracts the credential of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(token.trim())
        .filter(|token| !token.is_empty())
}

/// What later stages know about the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub requester: Requester,
}

/// Stage 1: resolve the requester identity.
pub(super) async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    ClientIp(ip): ClientIp,
) -> Result<RequestContext, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("missing credentials".into()))?;
    let user = state.authenticator.authenticate(token).await?;
    Ok(RequestContext {
        requester: Requester::new(user, ip),
    })
}

/// Stage 2: spend one unit of the requester's budget.
pub(super) async fn rate_limit(
    state: &AppState,
    context: RequestContext,
) -> Result<RequestContext, ApiError> {
    state.rate_limit.check(&context.requester).await?;
    Ok(context)
}
