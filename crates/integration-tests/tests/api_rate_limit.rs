use axum::http::{header, StatusCode};
use domains::{MockPostRepository, SortMode};
use integration_tests::{json_body, TestApp, TestAppBuilder, ADMIN_TOKEN, PEER_IP, VIEWER_TOKEN};
use api_adapters::Outcome;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn exhausted_budget_short_circuits_before_retrieval() {
    let mut posts = MockPostRepository::new();
    // The third request must never reach the repository.
    posts.expect_fetch_posts().times(2).returning(|_| Ok(Vec::new()));

    let app = TestAppBuilder::new()
        .posts(Arc::new(posts))
        .rate_limit(2, Duration::from_secs(20))
        .build();

    for _ in 0..2 {
        let response = app.get("/posts/discover", Some(VIEWER_TOKEN)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.get("/posts/discover", Some(VIEWER_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=20).contains(&retry_after));

    let body = json_body(response).await;
    assert_eq!(body["code"], "RATE_LIMITED");
    assert!(body["ttl"].as_u64().unwrap() <= 20_000);
    assert_eq!(app.metrics.count(SortMode::None, Outcome::RateLimited), 1);
}

async fn statuses_with_rotating_forwarded_for(app: &TestApp) -> Vec<StatusCode> {
    let mut statuses = Vec::new();
    for i in 0..10 {
        let forwarded = format!("10.9.9.{i}");
        let response = app
            .send(
                "/posts/discover",
                Some(VIEWER_TOKEN),
                PEER_IP,
                &[("x-forwarded-for", forwarded.as_str())],
            )
            .await;
        statuses.push(response.status());
    }
    statuses
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_budget() {
    let direct = TestAppBuilder::new()
        .rate_limit(1, Duration::from_secs(20))
        .build();
    let behind_proxy = TestAppBuilder::new()
        .rate_limit(1, Duration::from_secs(20))
        .trust_forwarded_for()
        .build();

    for app in [direct, behind_proxy] {
        let statuses = statuses_with_rotating_forwarded_for(&app).await;
        assert_eq!(statuses[0], StatusCode::OK);
        assert!(statuses[1..]
            .iter()
            .all(|status| *status == StatusCode::TOO_MANY_REQUESTS));
    }
}

#[tokio::test]
async fn budget_follows_the_user_across_addresses() {
    let app = TestAppBuilder::new()
        .rate_limit(1, Duration::from_secs(20))
        .build();

    let first = app
        .send("/posts/discover", Some(VIEWER_TOKEN), "198.51.100.1", &[])
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let elsewhere = app
        .send("/posts/discover", Some(VIEWER_TOKEN), "198.51.100.2", &[])
        .await;
    assert_eq!(elsewhere.status(), StatusCode::TOO_MANY_REQUESTS);

    let other_user = app
        .send("/posts/discover", Some(ADMIN_TOKEN), "198.51.100.1", &[])
        .await;
    assert_eq!(other_user.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_requests_do_not_spend_budget() {
    let app = TestAppBuilder::new()
        .rate_limit(1, Duration::from_secs(20))
        .build();

    for _ in 0..3 {
        let response = app.get("/posts/discover", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.get("/posts/discover", Some(VIEWER_TOKEN)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
