//! HTTP provider for the real recommendation backend.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{RawCandidate, TitlePage},
    services::aggregator::{SeenSetQuery, TitleRecsQuery, TitleSearchQuery},
    services::providers::RecommendationProvider,
};

#[derive(Clone)]
pub struct HttpProvider {
    http_client: HttpClient,
    base_url: String,
}

impl HttpProvider {
    /// Creates a provider against `base_url` with a bounded request timeout.
    /// A hung backend surfaces as an upstream error instead of blocking the
    /// caller indefinitely.
    pub fn new(base_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Serializes a seen-set query into the backend's request body. All
    /// fields are always present; the backend treats a null ratings map as
    /// "use the default rating for every seen title".
    fn seen_body(query: &SeenSetQuery) -> Value {
        json!({
            "seen_names": query.seen_names,
            "seen_ids": query.seen_ids,
            "ratings": query.ratings,
            "topk": query.topk,
            "minp": query.minp,
            "rating": query.rating,
        })
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for HttpProvider {
    async fn search_titles(&self, query: &TitleSearchQuery) -> AppResult<TitlePage> {
        let url = format!("{}/titles", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
            ("min_r", query.min_r.to_string()),
            ("minp", query.minp.to_string()),
        ];
        if let Some(s) = &query.s {
            params.push(("s", s.clone()));
        }

        let response = self.http_client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream_status(status, &body));
        }

        let page: TitlePage = response.json().await?;

        tracing::info!(
            search = query.s.as_deref().unwrap_or(""),
            count = page.count,
            results = page.results.len(),
            "Title search completed"
        );

        Ok(page)
    }

    async fn recommend_for_title(&self, query: &TitleRecsQuery) -> AppResult<Vec<RawCandidate>> {
        let url = format!("{}/getrecomenders", self.base_url);
        let params: [(&str, String); 3] = [
            ("q", query.q.clone()),
            ("topk", query.topk.to_string()),
            ("minp", query.minp.to_string()),
        ];
        let response = self.http_client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream_status(status, &body));
        }

        let candidates: Vec<RawCandidate> = response.json().await?;

        tracing::info!(
            query = %query.q,
            candidates = candidates.len(),
            "Fetched title recommendations"
        );

        Ok(candidates)
    }

    async fn recommend_for_seen(&self, query: &SeenSetQuery) -> AppResult<Vec<RawCandidate>> {
        let url = format!("{}/recommend_by_seen", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&Self::seen_body(query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream_status(status, &body));
        }

        let candidates: Vec<RawCandidate> = response.json().await?;

        tracing::info!(
            seen_names = query.seen_names.len(),
            seen_ids = query.seen_ids.len(),
            candidates = candidates.len(),
            "Fetched seen-set recommendations"
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_body_carries_all_tuning_fields() {
        let query = SeenSetQuery::from_payload(&json!({
            "seen_names": ["Naruto"],
            "topk": 5
        }))
        .unwrap();

        let body = HttpProvider::seen_body(&query);
        assert_eq!(body["seen_names"], json!(["Naruto"]));
        assert_eq!(body["seen_ids"], json!([]));
        assert_eq!(body["ratings"], json!(null));
        assert_eq!(body["topk"], json!(5));
        assert_eq!(body["minp"], json!(3.0));
        assert_eq!(body["rating"], json!(10.0));
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let provider =
            HttpProvider::new("http://localhost:8000/".to_string(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8000");
    }
}
