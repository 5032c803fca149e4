//! # storage-adapters
//!
//! Implementations of the retrieval and rate-limit ports.
//!
//! - [`memory::InMemoryPostRepository`] interprets a retrieval specification
//!   over posts held in memory, optionally seeded from a JSON file.
//! - [`rate_limit::InMemoryRateLimiter`] is a fixed-window counter keyed in a
//!   `DashMap`.
//! - `postgres::PgPostRepository` (feature `db-postgres`) translates the
//!   specification into SQL.

pub mod memory;
pub mod ordering;
pub mod rate_limit;
pub mod seed;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::InMemoryPostRepository;
pub use rate_limit::InMemoryRateLimiter;
pub use seed::{SeedData, SeedError};

#[cfg(feature = "db-postgres")]
pub use postgres::PgPostRepository;

/// Page size bounds applied by repositories when the caller leaves the
/// limit unset or asks for too much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl PageBounds {
    pub fn resolve(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

impl Default for PageBounds {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}
