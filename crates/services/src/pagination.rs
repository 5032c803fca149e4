//! # Pagination Resolver
//!
//! Picks the cursor shape from the sort mode. Unranked feeds page by ID
//! edges; ranked feeds resume just past an anchor's rank position.

use domains::{PaginationCursor, PostId, SortMode};

/// Under a ranked sort only `after_id` participates. `before_id` is ignored
/// there because backward paging over a ranking is not supported.
pub fn resolve_cursor(
    mode: SortMode,
    after_id: Option<PostId>,
    before_id: Option<PostId>,
) -> Option<PaginationCursor> {
    if mode.is_ranked() {
        after_id.map(PaginationCursor::anchor)
    } else {
        Some(PaginationCursor::Edge {
            after_id,
            before_id,
        })
    }
}
