//! # Sort Policy
//!
//! Maps a sort mode to its ordering and time-decay window.

use chrono::{DateTime, Duration, Utc};
use domains::{OrderBy, SortMode, TimeWindow, RANKED_ORDERING};

/// Time window for `mode` evaluated at `now`. Only the 7 and 30 day
/// rankings are bounded.
pub fn time_window(mode: SortMode, now: DateTime<Utc>) -> Option<TimeWindow> {
    let span = match mode {
        SortMode::MostLiked7Days => Duration::days(7),
        SortMode::MostLiked30Days => Duration::days(30),
        SortMode::MostLikedAllTime | SortMode::None => return None,
    };
    Some(TimeWindow {
        created_after: now - span,
    })
}

/// Explicit ordering for ranked modes; `None` keeps the collaborator default.
pub fn ordering(mode: SortMode) -> Option<Vec<OrderBy>> {
    mode.is_ranked().then(|| RANKED_ORDERING.to_vec())
}
