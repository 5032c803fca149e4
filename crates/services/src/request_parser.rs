//! # Request Parser
//!
//! Converts raw query strings into typed values. This is a total function:
//! malformed input always degrades to a safe default instead of an error.

use domains::{DiscoveryQuery, PostId, SortMode};

/// Typed view of a discovery request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDiscoveryRequest {
    /// `None` defers to the retrieval collaborator's page size.
    pub limit: Option<u32>,
    pub skip: u32,
    pub sort: SortMode,
    pub after_id: Option<PostId>,
    pub before_id: Option<PostId>,
}

pub fn parse_request(query: &DiscoveryQuery) -> ParsedDiscoveryRequest {
    ParsedDiscoveryRequest {
        limit: parse_limit(query.limit.as_deref()),
        skip: parse_skip(query.skip.as_deref()),
        sort: parse_sort(query.sort.as_deref()),
        after_id: parse_post_id(query.after_id.as_deref()),
        before_id: parse_post_id(query.before_id.as_deref()),
    }
}

/// Absent, unparsable, negative, or out-of-range input resolves to unset.
/// Negative values never collapse to zero.
pub fn parse_limit(raw: Option<&str>) -> Option<u32> {
    raw.and_then(parse_leading_integer)
        .and_then(|value| u32::try_from(value).ok())
}

/// Absent or unparsable input resolves to `0`.
pub fn parse_skip(raw: Option<&str>) -> u32 {
    parse_limit(raw).unwrap_or(0)
}

/// Exact, case-sensitive match against the ranked modes.
pub fn parse_sort(raw: Option<&str>) -> SortMode {
    let Some(raw) = raw else {
        return SortMode::None;
    };
    SortMode::RANKED
        .iter()
        .find(|(_, name)| *name == raw)
        .map(|(mode, _)| *mode)
        .unwrap_or(SortMode::None)
}

fn parse_post_id(raw: Option<&str>) -> Option<PostId> {
    raw.filter(|id| !id.is_empty()).map(PostId::new)
}

/// Reads an optionally signed run of decimal digits from the start of
/// `raw`, ignoring leading whitespace and anything after the digits.
/// `"12abc"` yields 12; `"abc"` and `""` yield nothing.
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
