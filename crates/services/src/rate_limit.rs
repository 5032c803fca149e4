//! # Rate Limit Gate
//!
//! Wraps the shared rate-limiter port with the budget of one route. The gate
//! runs before any request interpretation; a rejection short-circuits the
//! pipeline.

use domains::{DomainResult, RateLimitRule, RateLimiter, Requester};
use std::sync::Arc;
use std::time::Duration;

/// Name of the discovery feed's request budget.
pub const DISCOVER_RULE_NAME: &str = "posts_discover";

pub fn discover_rule(requests: u32, window: Duration) -> RateLimitRule {
    RateLimitRule {
        name: DISCOVER_RULE_NAME.to_string(),
        requests,
        window,
    }
}

pub struct RateLimitGate {
    limiter: Arc<dyn RateLimiter>,
    rule: RateLimitRule,
}

impl RateLimitGate {
    pub fn new(limiter: Arc<dyn RateLimiter>, rule: RateLimitRule) -> Self {
        Self { limiter, rule }
    }

    pub fn rule(&self) -> &RateLimitRule {
        &self.rule
    }

    /// Budgets are tracked per rule and authenticated requester, so a
    /// changing client address shares one budget.
    pub fn key_for(&self, requester: &Requester) -> String {
        format!("{}:{}", self.rule.name, requester.id)
    }

    pub async fn check(&self, requester: &Requester) -> DomainResult<()> {
        let key = self.key_for(requester);
        self.limiter.hit(&self.rule, &key).await.inspect_err(|err| {
            tracing::warn!(%key, error = %err, "rate limit rejected request");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Badges, DomainError, MockRateLimiter, UserId};

    fn requester() -> Requester {
        Requester {
            id: UserId::new("u7"),
            ip_address: "198.51.100.4".into(),
            badges: Badges::empty(),
        }
    }

    #[tokio::test]
    async fn gate_keys_by_rule_and_user() {
        let mut limiter = MockRateLimiter::new();
        limiter
            .expect_hit()
            .withf(|rule, key| {
                rule.name == "posts_discover" && key == "posts_discover:u7"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let gate = RateLimitGate::new(Arc::new(limiter), discover_rule(20, Duration::from_secs(20)));
        gate.check(&requester()).await.unwrap();
    }

    #[tokio::test]
    async fn gate_surfaces_rejection() {
        let mut limiter = MockRateLimiter::new();
        limiter.expect_hit().returning(|_, key| {
            Err(DomainError::RateLimited {
                key: key.to_string(),
                retry_after_ms: 1500,
            })
        });

        let gate = RateLimitGate::new(Arc::new(limiter), discover_rule(1, Duration::from_secs(1)));
        let err = gate.check(&requester()).await.unwrap_err();
        assert!(matches!(err, DomainError::RateLimited { retry_after_ms: 1500, .. }));
    }

    #[test]
    fn address_does_not_change_the_key() {
        let gate = RateLimitGate::new(
            Arc::new(MockRateLimiter::new()),
            discover_rule(20, Duration::from_secs(20)),
        );
        let mut moved = requester();
        moved.ip_address = "10.9.9.9".into();
        assert_eq!(gate.key_for(&requester()), gate.key_for(&moved));
    }
}
