//! # In-memory rate limiter
//!
//! Fixed-window counters keyed by an opaque string. Each window opens on the
//! first hit after the previous one expired.

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{DomainError, DomainResult, RateLimitRule, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    window: Duration,
    hits: u32,
}

#[derive(Debug, Default)]
pub struct InMemoryRateLimiter {
    windows: DashMap<String, Window>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every window that has expired. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.opened_at) < w.window);
        before - self.windows.len()
    }

    /// Periodically purges expired windows until the returned task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "expired rate limit windows removed");
                }
            }
        })
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn hit(&self, rule: &RateLimitRule, key: &str) -> DomainResult<()> {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            opened_at: now,
            window: rule.window,
            hits: 0,
        });

        let elapsed = now.duration_since(entry.opened_at);
        if elapsed >= rule.window {
            *entry = Window {
                opened_at: now,
                window: rule.window,
                hits: 0,
            };
        }

        if entry.hits >= rule.requests {
            let remaining = rule.window.saturating_sub(now.duration_since(entry.opened_at));
            return Err(DomainError::RateLimited {
                key: key.to_string(),
                retry_after_ms: u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            });
        }

        entry.hits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(requests: u32, window_ms: u64) -> RateLimitRule {
        RateLimitRule {
            name: "test".into(),
            requests,
            window: Duration::from_millis(window_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn allows_budget_then_rejects_until_window_expires() {
        let limiter = InMemoryRateLimiter::new();
        let rule = rule(2, 20_000);

        limiter.hit(&rule, "k").await.unwrap();
        limiter.hit(&rule, "k").await.unwrap();

        tokio::time::advance(Duration::from_millis(5_000)).await;
        match limiter.hit(&rule, "k").await {
            Err(DomainError::RateLimited { retry_after_ms, key }) => {
                assert_eq!(key, "k");
                assert_eq!(retry_after_ms, 15_000);
            }
            other => panic!("expected rate limit, got {other:?}"),
        }

        tokio::time::advance(Duration::from_millis(15_000)).await;
        limiter.hit(&rule, "k").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn keys_have_independent_budgets() {
        let limiter = InMemoryRateLimiter::new();
        let rule = rule(1, 1_000);
        limiter.hit(&rule, "a").await.unwrap();
        limiter.hit(&rule, "b").await.unwrap();
        assert!(limiter.hit(&rule, "a").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_expired_windows() {
        let limiter = InMemoryRateLimiter::new();
        limiter.hit(&rule(5, 1_000), "short").await.unwrap();
        limiter.hit(&rule(5, 60_000), "long").await.unwrap();

        tokio::time::advance(Duration::from_millis(2_000)).await;
        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.purge_expired(), 0);
    }
}
