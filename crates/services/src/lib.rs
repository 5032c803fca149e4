//! # services
//!
//! Turns a raw discovery request into a retrieval specification and runs it
//! against the retrieval port.
//!
//! Pipeline, leaf-first:
//!
//! 1. [`request_parser`]: raw strings into typed values, never failing.
//! 2. [`sort_policy`]: sort mode into ordering and time window.
//! 3. [`pagination`]: sort mode and ids into a cursor.
//! 4. [`query_composer`]: everything above into one specification.
//! 5. [`discovery`]: orchestration around the retrieval port.

pub mod admin_policy;
pub mod clock;
pub mod discovery;
pub mod pagination;
pub mod query_composer;
pub mod rate_limit;
pub mod request_parser;
pub mod sort_policy;

pub use admin_policy::BadgeAdminPolicy;
pub use clock::SystemClock;
pub use discovery::DiscoveryService;
pub use rate_limit::RateLimitGate;
pub use request_parser::{parse_request, ParsedDiscoveryRequest};
