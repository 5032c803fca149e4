//! # Ports
//!
//! Any adapter must implement these traits to be wired into the binary.

use crate::errors::DomainResult;
use crate::models::{AuthenticatedUser, Badges, Post};
use crate::retrieval::RetrievalSpecification;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// The data retrieval engine. Ordering and filtering are entirely its job;
/// callers return the page verbatim.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn fetch_posts(&self, spec: RetrievalSpecification) -> DomainResult<Vec<Post>>;
}

/// Maps opaque badge flags to the admin capability. Pure and total.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AdminPolicy: Send + Sync {
    fn is_admin(&self, badges: Badges) -> bool;
}

/// Resolves a bearer credential into an identity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> DomainResult<AuthenticatedUser>;
}

/// A named request budget: at most `requests` hits per `window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    pub name: String,
    pub requests: u32,
    pub window: Duration,
}

/// Shared keyed request-budget gate.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records one hit against `key` under `rule`.
    ///
    /// Returns `DomainError::RateLimited` once the budget for the current
    /// window is spent.
    async fn hit(&self, rule: &RateLimitRule, key: &str) -> DomainResult<()>;
}

/// Source of the evaluation instant.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
