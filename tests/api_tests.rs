use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use anirec_api::error::{AppError, AppResult};
use anirec_api::models::{RawCandidate, TitlePage};
use anirec_api::routes::create_router;
use anirec_api::services::aggregator::{SeenSetQuery, TitleRecsQuery, TitleSearchQuery};
use anirec_api::services::providers::RecommendationProvider;
use anirec_api::state::AppState;

/// Offline stand-in for the recommendation backend. Serves a canned dataset
/// behind the same provider interface the real HTTP client implements.
#[derive(Clone, Default)]
struct StubProvider {
    candidates: Value,
    titles: Value,
    fail_with_status: Option<u16>,
}

impl StubProvider {
    fn canned() -> Self {
        Self {
            candidates: json!([
                { "name": "Naruto", "correlation": 5 },
                { "title": "Bleach", "score": "3.2" },
                { "name": "One Piece", "correlation": 9 },
                { "anime_id": 20, "score": 4 }
            ]),
            titles: json!({
                "count": 2,
                "results": [
                    { "anime_id": 20, "name": "Naruto", "members": 683297 },
                    { "anime_id": 1735, "name": "Naruto: Shippuuden", "members": 533578 }
                ]
            }),
            fail_with_status: None,
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    fn check_failure(&self) -> AppResult<()> {
        if let Some(status) = self.fail_with_status {
            return Err(AppError::upstream_status(
                reqwest::StatusCode::from_u16(status).unwrap(),
                "upstream exploded",
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for StubProvider {
    async fn search_titles(&self, _query: &TitleSearchQuery) -> AppResult<TitlePage> {
        self.check_failure()?;
        Ok(serde_json::from_value(self.titles.clone()).unwrap())
    }

    async fn recommend_for_title(&self, _query: &TitleRecsQuery) -> AppResult<Vec<RawCandidate>> {
        self.check_failure()?;
        Ok(serde_json::from_value(self.candidates.clone()).unwrap())
    }

    async fn recommend_for_seen(&self, _query: &SeenSetQuery) -> AppResult<Vec<RawCandidate>> {
        self.check_failure()?;
        Ok(serde_json::from_value(self.candidates.clone()).unwrap())
    }
}

fn create_test_server(provider: StubProvider) -> TestServer {
    let state = AppState::new(Arc::new(provider));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(StubProvider::canned());
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommend_by_title_ranks_and_truncates() {
    let server = create_test_server(StubProvider::canned());

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "naruto")
        .add_query_param("topk", "2")
        .await;

    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], json!({ "name": "One Piece", "correlation": 9.0 }));
    assert_eq!(items[1], json!({ "name": "Naruto", "correlation": 5.0 }));
}

#[tokio::test]
async fn test_recommend_by_title_missing_query_is_bad_request() {
    // A failing provider would turn any upstream call into a 502, so the 400
    // also proves validation runs before the upstream is contacted.
    let server = create_test_server(StubProvider::failing(500));

    for query in ["", "   "] {
        let response = server
            .get("/api/v1/recommendations")
            .add_query_param("q", query)
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("'q'"));
    }
}

#[tokio::test]
async fn test_recommend_by_title_upstream_failure_is_bad_gateway() {
    let server = create_test_server(StubProvider::failing(500));

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("q", "naruto")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "Backend 500");
    assert_eq!(body["detail"], "upstream exploded");
}

#[tokio::test]
async fn test_recommend_by_seen_excludes_seen_titles() {
    let server = create_test_server(StubProvider::canned());

    let response = server
        .post("/api/v1/recommendations/by-seen")
        .json(&json!({ "seen_names": ["Naruto"], "topk": 2 }))
        .await;

    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], json!({ "name": "One Piece", "correlation": 9.0 }));
    assert_eq!(items[1], json!({ "name": "Bleach", "correlation": 3.2 }));
}

#[tokio::test]
async fn test_recommend_by_seen_filters_by_rating_keys() {
    let server = create_test_server(StubProvider::canned());

    // The candidate with only anime_id 20 normalizes to the name "20" and is
    // excluded because the ratings map declares that id as seen.
    let response = server
        .post("/api/v1/recommendations/by-seen")
        .json(&json!({ "ratings": { "20": 8 } }))
        .await;

    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    let names: Vec<&str> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["One Piece", "Naruto", "Bleach"]);
}

#[tokio::test]
async fn test_recommend_by_seen_empty_signals_is_bad_request() {
    let server = create_test_server(StubProvider::failing(500));

    let response = server
        .post("/api/v1/recommendations/by-seen")
        .json(&json!({ "seen_names": [], "seen_ids": [] }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("seen_names"));
}

#[tokio::test]
async fn test_recommend_by_seen_upstream_failure_is_bad_gateway() {
    let server = create_test_server(StubProvider::failing(503));

    let response = server
        .post("/api/v1/recommendations/by-seen")
        .json(&json!({ "seen_names": ["Naruto"] }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "Backend 503");
}

#[tokio::test]
async fn test_title_search_passthrough() {
    let server = create_test_server(StubProvider::canned());

    let response = server
        .get("/api/v1/titles")
        .add_query_param("q", "naru")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["name"], "Naruto");
    assert_eq!(body["results"][0]["id"], 20);
    // Extra upstream columns survive the passthrough.
    assert_eq!(body["results"][0]["members"], 683297);
}

#[tokio::test]
async fn test_title_search_accepts_s_alias_and_listing_mode() {
    let server = create_test_server(StubProvider::canned());

    let response = server
        .get("/api/v1/titles")
        .add_query_param("s", "naru")
        .await;
    response.assert_status_ok();

    // No search text at all is the alphabetical listing mode, still valid.
    let response = server.get("/api/v1/titles").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_echoed_in_response() {
    let server = create_test_server(StubProvider::canned());

    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}
