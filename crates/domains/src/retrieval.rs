//! # Retrieval Specification
//!
//! The single value handed to the retrieval collaborator. It is composed
//! fresh per request, never mutated afterwards, and consumed by value.

use crate::models::{PostId, UserId};
use chrono::{DateTime, Utc};

/// Number of entries skipped past the anchor of an anchor cursor.
pub const ANCHOR_SKIP: u32 = 1;

/// Lower bound on post creation time for time-decayed rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub created_after: DateTime<Utc>,
}

/// Where a page starts. The two shapes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationCursor {
    /// ID-relative boundaries in the default newest-first order. "After"
    /// is positional: `after_id` yields posts older than that post and
    /// `before_id` posts newer than it. Both absent means "first page".
    Edge {
        after_id: Option<PostId>,
        before_id: Option<PostId>,
    },
    /// Resume `skip` entries past the rank position held by `id`.
    Anchor { id: PostId, skip: u32 },
}

impl PaginationCursor {
    pub fn anchor(id: PostId) -> Self {
        PaginationCursor::Anchor {
            id,
            skip: ANCHOR_SKIP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    EstimatedLikes,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: OrderField,
    pub direction: SortDirection,
}

/// Ordering used by every ranked sort mode: most liked first, ties broken
/// by the oldest post.
pub const RANKED_ORDERING: [OrderBy; 2] = [
    OrderBy {
        field: OrderField::EstimatedLikes,
        direction: SortDirection::Desc,
    },
    OrderBy {
        field: OrderField::CreatedAt,
        direction: SortDirection::Asc,
    },
];

/// Whether block relationships hide content from the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingVisibility {
    /// Posts across a block relationship with the requester are hidden.
    Enforced,
    /// Admin bypass: the requester sees everything.
    Bypassed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub requester_id: UserId,
    pub requester_ip: String,
    pub blocking: BlockingVisibility,
}

/// Row filter. All conditions are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    /// Only posts whose `repost_id` is absent.
    pub exclude_reposts: bool,
    pub created_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalSpecification {
    pub visibility: Visibility,
    pub filter: PostFilter,
    /// `None` leaves ordering to the collaborator's default (newest first).
    pub ordering: Option<Vec<OrderBy>>,
    pub cursor: Option<PaginationCursor>,
    /// `None` lets the collaborator apply its own page size.
    pub limit: Option<u32>,
}

impl RetrievalSpecification {
    pub fn is_ranked(&self) -> bool {
        self.ordering.is_some()
    }
}
