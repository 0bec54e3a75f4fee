//! Request validation and aggregation orchestration.
//!
//! Every request is turned into a fully-populated, validated value before
//! any business logic runs; defaults are applied exactly once, here, instead
//! of being scattered through the aggregation code.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::models::{RankedItem, TitlePage};
use crate::services::providers::RecommendationProvider;
use crate::services::ranking::{self, coerce_number, scalar_to_string};

pub const DEFAULT_TOPK: i64 = 10;
pub const DEFAULT_MINP: f64 = 3.0;
pub const DEFAULT_RATING: f64 = 10.0;

pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const MAX_SEARCH_LIMIT: u32 = 500;

/// Validated single-title recommendation query.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecsQuery {
    pub q: String,
    pub topk: i64,
    pub minp: f64,
}

impl TitleRecsQuery {
    pub fn new(q: &str, topk: Option<i64>, minp: Option<f64>) -> AppResult<Self> {
        let q = q.trim();
        if q.is_empty() {
            return Err(AppError::InvalidRequest(
                "Query parameter 'q' must not be empty".to_string(),
            ));
        }
        Ok(Self {
            q: q.to_string(),
            topk: topk.unwrap_or(DEFAULT_TOPK),
            minp: minp.unwrap_or(DEFAULT_MINP),
        })
    }
}

/// Validated title search/listing query.
///
/// Always constructible: an absent search string means alphabetical listing
/// mode, and out-of-range paging values are clamped rather than rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleSearchQuery {
    pub s: Option<String>,
    pub limit: u32,
    pub offset: u32,
    pub min_r: i64,
    pub minp: f64,
}

impl TitleSearchQuery {
    pub fn new(
        s: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
        min_r: Option<i64>,
        minp: Option<f64>,
    ) -> Self {
        let s = s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
        let limit = limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT as i64)
            .clamp(1, MAX_SEARCH_LIMIT as i64) as u32;
        let offset = offset.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        Self {
            s,
            limit,
            offset,
            min_r: min_r.unwrap_or(0),
            minp: minp.unwrap_or(DEFAULT_MINP),
        }
    }
}

/// Validated seen-set recommendation request.
///
/// Built from free-form client JSON: the picker UI sends whatever state it
/// has, so malformed optional fields degrade to defaults instead of failing
/// the whole request. The only hard requirement is at least one signal of
/// what the user has seen.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenSetQuery {
    pub seen_names: Vec<String>,
    pub seen_ids: Vec<Value>,
    pub ratings: Option<Map<String, Value>>,
    pub topk: i64,
    pub minp: f64,
    pub rating: f64,
}

impl SeenSetQuery {
    pub fn from_payload(payload: &Value) -> AppResult<Self> {
        let field = |key: &str| payload.as_object().and_then(|m| m.get(key));

        let seen_names: Vec<String> = field("seen_names")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(scalar_to_string).collect())
            .unwrap_or_default();

        let seen_ids: Vec<Value> = field("seen_ids")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter(|v| !v.is_null()).cloned().collect())
            .unwrap_or_default();

        let ratings: Option<Map<String, Value>> = field("ratings")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
            .cloned();

        if seen_names.is_empty() && seen_ids.is_empty() && ratings.is_none() {
            return Err(AppError::InvalidRequest(
                "At least one of 'seen_names', 'seen_ids' or 'ratings' is required".to_string(),
            ));
        }

        let topk = field("topk")
            .and_then(coerce_number)
            .map(|n| n as i64)
            .unwrap_or(DEFAULT_TOPK);
        let minp = field("minp").and_then(coerce_number).unwrap_or(DEFAULT_MINP);
        let rating = field("rating")
            .and_then(coerce_number)
            .unwrap_or(DEFAULT_RATING);

        Ok(Self {
            seen_names,
            seen_ids,
            ratings,
            topk,
            minp,
            rating,
        })
    }

    /// The set of names to exclude from results: declared names, stringified
    /// ids and rating-map keys, all lowercased. Id-derived entries catch
    /// candidates the normalizer could only name by their id.
    pub fn seen_set(&self) -> HashSet<String> {
        let mut seen: HashSet<String> = self
            .seen_names
            .iter()
            .map(|name| name.trim().to_lowercase())
            .collect();
        seen.extend(
            self.seen_ids
                .iter()
                .filter_map(scalar_to_string)
                .map(|id| id.to_lowercase()),
        );
        if let Some(ratings) = &self.ratings {
            seen.extend(ratings.keys().map(|key| key.trim().to_lowercase()));
        }
        seen
    }
}

/// Single-title lookup: upstream → normalize → rank. No seen-set in this
/// path.
pub async fn recommend_by_title(
    provider: &dyn RecommendationProvider,
    query: &TitleRecsQuery,
) -> AppResult<Vec<RankedItem>> {
    let raw = provider.recommend_for_title(query).await?;
    let items: Vec<RankedItem> = raw.iter().map(ranking::normalize).collect();
    let ranked = ranking::rank(items, query.topk);

    tracing::info!(
        query = %query.q,
        candidates = raw.len(),
        results = ranked.len(),
        "Title recommendation completed"
    );

    Ok(ranked)
}

/// Seen-set lookup: upstream → normalize → filter seen → rank.
pub async fn recommend_by_seen(
    provider: &dyn RecommendationProvider,
    query: &SeenSetQuery,
) -> AppResult<Vec<RankedItem>> {
    let raw = provider.recommend_for_seen(query).await?;
    let items: Vec<RankedItem> = raw.iter().map(ranking::normalize).collect();
    let items = ranking::filter_seen(items, &query.seen_set());
    let ranked = ranking::rank(items, query.topk);

    tracing::info!(
        seen = query.seen_names.len() + query.seen_ids.len(),
        candidates = raw.len(),
        results = ranked.len(),
        "Seen-set recommendation completed"
    );

    Ok(ranked)
}

/// Title search/listing passthrough. Ordering and pagination are owned by
/// the upstream; this layer only validates the paging parameters.
pub async fn search_titles(
    provider: &dyn RecommendationProvider,
    query: &TitleSearchQuery,
) -> AppResult<TitlePage> {
    provider.search_titles(query).await
}
