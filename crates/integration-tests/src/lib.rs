//! Shared fixtures for the HTTP-level tests.
//!
//! [`TestApp`] wires the real router, service and adapters around a fixed
//! clock so that time-window assertions are exact.

use api_adapters::{router, AppState, DiscoverMetrics, ProxyTrust};
use auth_adapters::StaticTokenAuthenticator;
use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use domains::{Authenticator, Badges, Clock, Post, PostId, PostRepository, RateLimitRule, UserId};
use services::rate_limit::discover_rule;
use services::{BadgeAdminPolicy, DiscoveryService, RateLimitGate};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use storage_adapters::seed::BlockEntry;
use storage_adapters::{InMemoryPostRepository, InMemoryRateLimiter, PageBounds, SeedData};
use tower::ServiceExt;

pub const VIEWER_TOKEN: &str = "viewer-token";
pub const ADMIN_TOKEN: &str = "admin-token";
/// Socket peer used by [`TestApp::get`].
pub const PEER_IP: &str = "203.0.113.10";

/// Evaluation instant shared by the clock and the fixture data.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn post(id: &str, author: &str, likes: i64, age: Duration) -> Post {
    Post {
        id: PostId::new(id),
        created_by_id: UserId::new(author),
        content: format!("{id} by {author}"),
        repost_id: None,
        estimate_likes: likes,
        created_at: now() - age,
    }
}

/// Newest first: p-new, p-week, p-tie, p-month, p-old.
/// `viewer` has blocked `mallory`; `r-repost` is a repost.
pub fn seed() -> SeedData {
    let mut repost = post("r-repost", "bob", 9_999, Duration::hours(1));
    repost.repost_id = Some(PostId::new("p-old"));

    SeedData {
        posts: vec![
            post("p-new", "alice", 3, Duration::hours(1)),
            post("p-week", "bob", 50, Duration::days(3)),
            post("p-tie", "erin", 50, Duration::days(5)),
            post("p-month", "carol", 80, Duration::days(20)),
            post("p-old", "dave", 500, Duration::days(90)),
            post("p-blocked", "mallory", 1_000, Duration::days(2)),
            repost,
        ],
        blocks: vec![BlockEntry {
            blocker_id: UserId::new("viewer"),
            blocked_id: UserId::new("mallory"),
        }],
    }
}

pub fn authenticator() -> StaticTokenAuthenticator {
    StaticTokenAuthenticator::new()
        .with_token(VIEWER_TOKEN, "viewer", Badges::empty())
        .with_token(ADMIN_TOKEN, "admin", Badges::ADMIN)
}

pub struct TestApp {
    pub router: Router,
    pub metrics: Arc<DiscoverMetrics>,
}

pub struct TestAppBuilder {
    posts: Arc<dyn PostRepository>,
    authenticator: Arc<dyn Authenticator>,
    rule: RateLimitRule,
    proxy: ProxyTrust,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::with_seed(PageBounds::default(), seed())),
            authenticator: Arc::new(authenticator()),
            rule: discover_rule(1_000, std::time::Duration::from_secs(20)),
            proxy: ProxyTrust::default(),
        }
    }

    pub fn posts(mut self, posts: Arc<dyn PostRepository>) -> Self {
        self.posts = posts;
        self
    }

    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn rate_limit(mut self, requests: u32, window: std::time::Duration) -> Self {
        self.rule = discover_rule(requests, window);
        self
    }

    pub fn trust_forwarded_for(mut self) -> Self {
        self.proxy = ProxyTrust {
            trust_forwarded_for: true,
        };
        self
    }

    pub fn build(self) -> TestApp {
        let metrics = Arc::new(DiscoverMetrics::new());
        let state = AppState {
            discovery: Arc::new(DiscoveryService::new(
                self.posts,
                Arc::new(BadgeAdminPolicy),
                Arc::new(FixedClock(now())),
            )),
            authenticator: self.authenticator,
            rate_limit: Arc::new(RateLimitGate::new(Arc::new(InMemoryRateLimiter::new()), self.rule)),
            metrics: metrics.clone(),
            proxy: self.proxy,
        };
        TestApp {
            router: router(state),
            metrics,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(uri, token, PEER_IP, &[]).await
    }

    /// Sends a GET from socket peer `peer` with extra `headers`.
    pub async fn send(
        &self,
        uri: &str,
        token: Option<&str>,
        peer: &str,
        headers: &[(&str, &str)],
    ) -> Response {
        let peer: IpAddr = peer.parse().unwrap();
        let mut request = Request::builder()
            .uri(uri)
            .extension(ConnectInfo(SocketAddr::new(peer, 40_000)));
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// Requests a discovery page as the viewer and returns its post ids.
    pub async fn discover_ids(&self, query: &str, token: &str) -> Vec<String> {
        let response = self.get(&format!("/posts/discover{query}"), Some(token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        body.as_array()
            .expect("discover returns a bare array")
            .iter()
            .map(|post| post["id"].as_str().unwrap().to_string())
            .collect()
    }
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
