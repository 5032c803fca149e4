//! # Query Composer
//!
//! Merges visibility, filters, ordering, and cursor into the one
//! specification handed to the retrieval port.

use crate::request_parser::ParsedDiscoveryRequest;
use crate::{pagination, sort_policy};
use chrono::{DateTime, Utc};
use domains::{
    BlockingVisibility, PostFilter, Requester, RetrievalSpecification, Visibility,
};

/// Composition is infallible for typed input.
pub fn compose(
    requester: &Requester,
    is_admin: bool,
    request: ParsedDiscoveryRequest,
    now: DateTime<Utc>,
) -> RetrievalSpecification {
    let window = sort_policy::time_window(request.sort, now);
    let cursor = pagination::resolve_cursor(request.sort, request.after_id, request.before_id);

    RetrievalSpecification {
        visibility: Visibility {
            requester_id: requester.id.clone(),
            requester_ip: requester.ip_address.clone(),
            blocking: if is_admin {
                BlockingVisibility::Bypassed
            } else {
                BlockingVisibility::Enforced
            },
        },
        filter: PostFilter {
            exclude_reposts: true,
            created_after: window.map(|w| w.created_after),
        },
        ordering: sort_policy::ordering(request.sort),
        cursor,
        limit: request.limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_parser::parse_request;
    use chrono::{Duration, TimeZone};
    use domains::{
        Badges, DiscoveryQuery, PaginationCursor, PostId, UserId, RANKED_ORDERING,
    };

    fn requester() -> Requester {
        Requester {
            id: UserId::new("u1"),
            ip_address: "10.0.0.1".into(),
            badges: Badges::empty(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
    }

    fn compose_query(query: DiscoveryQuery, is_admin: bool) -> RetrievalSpecification {
        compose(&requester(), is_admin, parse_request(&query), now())
    }

    #[test]
    fn ranked_seven_day_scenario() {
        let spec = compose_query(
            DiscoveryQuery {
                sort: Some("mostLiked7Days".into()),
                after_id: Some("p123".into()),
                ..Default::default()
            },
            false,
        );

        assert_eq!(spec.ordering, Some(RANKED_ORDERING.to_vec()));
        assert_eq!(
            spec.cursor,
            Some(PaginationCursor::Anchor {
                id: PostId::new("p123"),
                skip: 1,
            })
        );
        assert_eq!(spec.filter.created_after, Some(now() - Duration::days(7)));
        assert!(spec.filter.exclude_reposts);
    }

    #[test]
    fn edge_scenario_has_no_ordering_or_window() {
        let spec = compose_query(
            DiscoveryQuery {
                after_id: Some("p1".into()),
                before_id: Some("p2".into()),
                ..Default::default()
            },
            false,
        );

        assert_eq!(
            spec.cursor,
            Some(PaginationCursor::Edge {
                after_id: Some(PostId::new("p1")),
                before_id: Some(PostId::new("p2")),
            })
        );
        assert_eq!(spec.ordering, None);
        assert_eq!(spec.filter.created_after, None);
        assert_eq!(spec.limit, None);
    }

    #[test]
    fn before_id_has_no_effect_under_ranked_sort() {
        let with_before = compose_query(
            DiscoveryQuery {
                sort: Some("mostLikedAllTime".into()),
                after_id: Some("p1".into()),
                before_id: Some("p9".into()),
                ..Default::default()
            },
            false,
        );
        let without_before = compose_query(
            DiscoveryQuery {
                sort: Some("mostLikedAllTime".into()),
                after_id: Some("p1".into()),
                ..Default::default()
            },
            false,
        );
        assert_eq!(with_before, without_before);
    }

    #[test]
    fn anti_repost_filter_is_always_present() {
        let queries = [
            DiscoveryQuery::default(),
            DiscoveryQuery {
                sort: Some("mostLiked30days".into()),
                ..Default::default()
            },
            DiscoveryQuery {
                sort: Some("garbage".into()),
                limit: Some("-1".into()),
                ..Default::default()
            },
        ];
        for query in queries {
            for is_admin in [false, true] {
                assert!(compose_query(query.clone(), is_admin).filter.exclude_reposts);
            }
        }
    }

    #[test]
    fn blocking_depends_only_on_admin_capability() {
        let spec = compose_query(DiscoveryQuery::default(), false);
        assert_eq!(spec.visibility.blocking, BlockingVisibility::Enforced);
        assert_eq!(spec.visibility.requester_id, UserId::new("u1"));
        assert_eq!(spec.visibility.requester_ip, "10.0.0.1");

        let spec = compose_query(DiscoveryQuery::default(), true);
        assert_eq!(spec.visibility.blocking, BlockingVisibility::Bypassed);
    }

    #[test]
    fn unknown_sort_behaves_like_no_sort() {
        let spec = compose_query(
            DiscoveryQuery {
                sort: Some("mostLiked30Days".into()),
                after_id: Some("p1".into()),
                ..Default::default()
            },
            false,
        );
        assert_eq!(spec.ordering, None);
        assert_eq!(spec.filter.created_after, None);
        assert!(matches!(spec.cursor, Some(PaginationCursor::Edge { .. })));
    }

    #[test]
    fn limit_passes_through() {
        let spec = compose_query(
            DiscoveryQuery {
                limit: Some("15".into()),
                ..Default::default()
            },
            false,
        );
        assert_eq!(spec.limit, Some(15));
    }
}
