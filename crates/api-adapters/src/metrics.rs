//! Request counters exposed at `/metrics`.

use domains::SortMode;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Unauthorized,
    RateLimited,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Unauthorized => "unauthorized",
            Outcome::RateLimited => "rate_limited",
            Outcome::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EncodeLabelSet)]
struct DiscoverLabels {
    sort: &'static str,
    outcome: &'static str,
}

#[derive(Debug)]
pub struct DiscoverMetrics {
    registry: Registry,
    requests: Family<DiscoverLabels, Counter>,
}

impl DiscoverMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let requests = Family::<DiscoverLabels, Counter>::default();
        registry.register(
            "discover_requests",
            "Discovery feed requests by sort mode and outcome",
            requests.clone(),
        );
        Self { registry, requests }
    }

    pub fn record(&self, sort: SortMode, outcome: Outcome) {
        self.requests
            .get_or_create(&DiscoverLabels {
                sort: sort.label(),
                outcome: outcome.as_str(),
            })
            .inc();
    }

    pub fn count(&self, sort: SortMode, outcome: Outcome) -> u64 {
        self.requests
            .get_or_create(&DiscoverLabels {
                sort: sort.label(),
                outcome: outcome.as_str(),
            })
            .get()
    }

    /// OpenMetrics text exposition.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for DiscoverMetrics {
    fn default() -> Self {
        Self::new()
    }
}
