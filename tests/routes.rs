// tests/routes.rs
mod common;

use std::sync::Arc;
use common::{january_and_february, StubFeed, StubReply};
use serde_json::Value;
use treasury_yields::routes::routes;
use treasury_yields::services::cache::YieldCache;
use treasury_yields::services::yields::YieldsService;
use warp::http::StatusCode;

fn api(stub: &Arc<StubFeed>) -> Arc<YieldsService<Arc<StubFeed>>> {
    Arc::new(YieldsService::new(stub.clone(), YieldCache::default()))
}

#[tokio::test]
async fn get_yields_returns_json_rows() {
    let stub = Arc::new(StubFeed::serving(january_and_february()));
    let filter = routes(api(&stub));

    let res = warp::test::request()
        .method("GET")
        .path("/yields?year=2024&month=1")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["year"], 2024);
    assert_eq!(body["month"], 1);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["date"], "2024-01-02");
    assert_eq!(rows[0]["wk4"], 5.41);
    // absent tenors keep their key
    assert!(rows[0].get("wk6").unwrap().is_null());
}

#[tokio::test]
async fn whole_year_omits_month() {
    let stub = Arc::new(StubFeed::serving(january_and_february()));
    let filter = routes(api(&stub));

    let res = warp::test::request().path("/yields?year=2024").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert!(body.get("month").is_none());
    assert_eq!(body["rows"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let stub = Arc::new(StubFeed::serving(january_and_february()));
    let filter = routes(api(&stub));

    let first = warp::test::request().path("/yields?year=2024&month=1").reply(&filter).await;
    let second = warp::test::request().path("/yields?year=2024&month=1").reply(&filter).await;
    assert_eq!(first.body(), second.body());
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn bad_input_is_400() {
    let stub = Arc::new(StubFeed::serving(january_and_february()));
    let filter = routes(api(&stub));

    for path in [
        "/yields",
        "/yields?year=invalid",
        "/yields?year=1800",
        "/yields?year=2024&month=13",
        "/yields?year=2024&month=jan",
    ] {
        let res = warp::test::request().path(path).reply(&filter).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", path);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert!(body["error"].is_string());
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn upstream_failure_is_503() {
    let stub = Arc::new(StubFeed::new(StubReply::Status(502)));
    let filter = routes(api(&stub));

    let res = warp::test::request().path("/yields?year=2024&month=1").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body["error"], "Treasury API unavailable");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let stub = Arc::new(StubFeed::serving(january_and_february()));
    let filter = routes(api(&stub));

    let res = warp::test::request().path("/orders").reply(&filter).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
