//! # domains
//!
//! The central domain model and port definitions for the discovery service.
//! Nothing in this crate performs I/O: adapters implement the ports, and the
//! `services` crate drives them.

pub mod errors;
pub mod models;
pub mod ports;
pub mod retrieval;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
pub use retrieval::*;
