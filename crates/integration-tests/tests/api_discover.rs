//! End-to-end behaviour of `GET /posts/discover` over the in-memory store.

use axum::http::StatusCode;
use domains::SortMode;
use integration_tests::{json_body, text_body, TestAppBuilder, ADMIN_TOKEN, VIEWER_TOKEN};
use api_adapters::Outcome;

#[tokio::test]
async fn unsorted_feed_is_newest_first_without_reposts_or_blocked_authors() {
    let app = TestAppBuilder::new().build();
    let ids = app.discover_ids("", VIEWER_TOKEN).await;
    assert_eq!(ids, ["p-new", "p-week", "p-tie", "p-month", "p-old"]);
}

#[tokio::test]
async fn discover_alias_serves_the_same_feed() {
    let app = TestAppBuilder::new().build();
    let response = app.get("/discover?limit=1", Some(VIEWER_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body[0]["id"], "p-new");
    assert_eq!(body[0]["createdById"], "alice");
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn seven_day_ranking_pages_from_anchor() {
    let app = TestAppBuilder::new().build();

    let first = app.discover_ids("?sort=mostLiked7Days", VIEWER_TOKEN).await;
    assert_eq!(first, ["p-tie", "p-week", "p-new"]);

    let next = app
        .discover_ids("?sort=mostLiked7Days&afterId=p-tie", VIEWER_TOKEN)
        .await;
    assert_eq!(next, ["p-week", "p-new"]);
}

#[tokio::test]
async fn thirty_day_and_all_time_windows_widen_the_ranking() {
    let app = TestAppBuilder::new().build();
    assert_eq!(
        app.discover_ids("?sort=mostLiked30days", VIEWER_TOKEN).await,
        ["p-month", "p-tie", "p-week", "p-new"]
    );
    assert_eq!(
        app.discover_ids("?sort=mostLikedAllTime", VIEWER_TOKEN).await,
        ["p-old", "p-month", "p-tie", "p-week", "p-new"]
    );
}

#[tokio::test]
async fn before_id_is_inert_under_ranked_sort() {
    let app = TestAppBuilder::new().build();
    let plain = app.discover_ids("?sort=mostLiked7Days", VIEWER_TOKEN).await;
    let with_before = app
        .discover_ids("?sort=mostLiked7Days&beforeId=p-new", VIEWER_TOKEN)
        .await;
    assert_eq!(plain, with_before);
}

#[tokio::test]
async fn edge_cursor_pages_between_ids_when_unsorted() {
    let app = TestAppBuilder::new().build();
    assert_eq!(
        app.discover_ids("?afterId=p-new&beforeId=p-month", VIEWER_TOKEN).await,
        ["p-week", "p-tie"]
    );
    assert_eq!(
        app.discover_ids("?afterId=p-tie", VIEWER_TOKEN).await,
        ["p-month", "p-old"]
    );
}

#[tokio::test]
async fn malformed_parameters_fall_back_to_defaults() {
    let app = TestAppBuilder::new().build();
    let everything = ["p-new", "p-week", "p-tie", "p-month", "p-old"];

    assert_eq!(app.discover_ids("?limit=-5", VIEWER_TOKEN).await, everything);
    assert_eq!(app.discover_ids("?limit=abc&skip=xyz", VIEWER_TOKEN).await, everything);
    // Wrong case is not a recognised sort mode.
    assert_eq!(app.discover_ids("?sort=mostLiked30Days", VIEWER_TOKEN).await, everything);
    assert_eq!(app.discover_ids("?limit=2", VIEWER_TOKEN).await, ["p-new", "p-week"]);
}

#[tokio::test]
async fn admin_bypasses_blocking() {
    let app = TestAppBuilder::new().build();
    let ids = app.discover_ids("?sort=mostLikedAllTime", ADMIN_TOKEN).await;
    assert_eq!(ids[0], "p-blocked");
    assert!(!ids.iter().any(|id| id == "r-repost"));
}

#[tokio::test]
async fn missing_or_unknown_token_is_unauthorized() {
    let app = TestAppBuilder::new().build();

    let response = app.get("/posts/discover", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");

    let response = app.get("/posts/discover", Some("forged")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.metrics.count(SortMode::None, Outcome::Unauthorized), 2);
}

#[tokio::test]
async fn metrics_and_health_endpoints() {
    let app = TestAppBuilder::new().build();
    app.discover_ids("?sort=mostLiked7Days", VIEWER_TOKEN).await;

    let response = app.get("/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = text_body(response).await;
    assert!(text.contains("discover_requests_total"));
    assert!(text.contains(r#"sort="mostLiked7Days""#));
    assert!(text.contains(r#"outcome="ok""#));

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response).await, "ok");
}

#[tokio::test]
async fn ranked_anchor_outside_the_window_keeps_paging() {
    let app = TestAppBuilder::new().build();
    // p-month is older than seven days but its likes still place the cursor.
    assert_eq!(
        app.discover_ids("?sort=mostLiked7Days&afterId=p-month", VIEWER_TOKEN).await,
        ["p-tie", "p-week", "p-new"]
    );
    assert_eq!(
        app.discover_ids("?sort=mostLikedAllTime&afterId=r-repost", VIEWER_TOKEN).await,
        ["p-old", "p-month", "p-tie", "p-week", "p-new"]
    );
}

#[tokio::test]
async fn repeated_parameter_keeps_the_rest_of_the_query() {
    let app = TestAppBuilder::new().build();
    assert_eq!(
        app.discover_ids("?sort=mostLiked7Days&limit=1&limit=2", VIEWER_TOKEN).await,
        ["p-tie"]
    );
}
