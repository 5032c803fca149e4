//! # Domain Models
//!
//! Posts, requesters and the raw discovery request as it arrives from the
//! transport layer. Identifiers are opaque strings: the discovery logic never
//! inspects their structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A post as returned by the retrieval collaborator and serialized to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub created_by_id: UserId,
    pub content: String,
    /// Set when this post re-shares another post.
    pub repost_id: Option<PostId>,
    /// Approximate like count used for ranking.
    pub estimate_likes: i64,
    pub created_at: DateTime<Utc>,
}

/// Opaque capability flags attached to a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Badges(pub u64);

impl Badges {
    pub const FOUNDER: Badges = Badges(1 << 0);
    pub const ADMIN: Badges = Badges(1 << 1);

    pub const fn empty() -> Self {
        Badges(0)
    }

    /// True when every bit of `other` is set.
    pub const fn contains(self, other: Badges) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Badges) -> Self {
        Badges(self.0 | other.0)
    }
}

/// Identity produced by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub badges: Badges,
}

/// The requester of a discovery page: authenticated identity plus the
/// network address the request arrived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: UserId,
    pub ip_address: String,
    pub badges: Badges,
}

impl Requester {
    pub fn new(user: AuthenticatedUser, ip_address: impl Into<String>) -> Self {
        Self {
            id: user.id,
            ip_address: ip_address.into(),
            badges: user.badges,
        }
    }
}

/// Raw query parameters of a discovery request, exactly as received.
///
/// Every field is textual and optional; interpretation happens in the
/// request parser, which never rejects input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryQuery {
    pub limit: Option<String>,
    pub after_id: Option<String>,
    pub before_id: Option<String>,
    pub sort: Option<String>,
    pub skip: Option<String>,
}

impl DiscoveryQuery {
    /// Builds a query from raw key/value pairs. The first occurrence of a
    /// repeated key wins; unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "limit" => &mut query.limit,
                "afterId" => &mut query.after_id,
                "beforeId" => &mut query.before_id,
                "sort" => &mut query.sort,
                "skip" => &mut query.skip,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

/// Ranking mode of a discovery feed. Exactly one is active per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Chronological feed, ordered by the retrieval collaborator's default.
    #[default]
    None,
    MostLiked7Days,
    MostLiked30Days,
    MostLikedAllTime,
}

impl SortMode {
    /// Ranked modes, paired with their query-string spelling.
    pub const RANKED: [(SortMode, &'static str); 3] = [
        (SortMode::MostLiked7Days, "mostLiked7Days"),
        (SortMode::MostLiked30Days, "mostLiked30days"),
        (SortMode::MostLikedAllTime, "mostLikedAllTime"),
    ];

    pub fn is_ranked(self) -> bool {
        self != SortMode::None
    }

    /// Query-string spelling; `None` has no spelling of its own.
    pub fn as_query_value(self) -> Option<&'static str> {
        Self::RANKED
            .iter()
            .find(|(mode, _)| *mode == self)
            .map(|(_, name)| *name)
    }

    /// Stable label for logs and metrics.
    pub fn label(self) -> &'static str {
        self.as_query_value().unwrap_or("none")
    }
}
