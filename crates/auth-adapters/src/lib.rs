//! # auth-adapters
//!
//! Implementations of the `Authenticator` port.
//!
//! - [`StaticTokenAuthenticator`]: fixed token → identity table, for local
//!   development and tests.
//! - `JwtAuthenticator` (feature `auth-jwt`): HS256 bearer tokens whose
//!   `sub` is the user id and `badges` the capability flags.

pub mod error;
pub mod static_token;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use error::AuthError;
pub use static_token::StaticTokenAuthenticator;

#[cfg(feature = "auth-jwt")]
pub use jwt::{Claims, JwtAuthenticator};
