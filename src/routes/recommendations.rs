use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::AppResult,
    models::RankedItem,
    services::aggregator::{self, SeenSetQuery, TitleRecsQuery},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecsParams {
    q: Option<String>,
    topk: Option<i64>,
    minp: Option<f64>,
}

/// Handler for single-title recommendations
pub async fn by_title(
    State(state): State<AppState>,
    Query(params): Query<RecsParams>,
) -> AppResult<Json<Vec<RankedItem>>> {
    let query = TitleRecsQuery::new(params.q.as_deref().unwrap_or(""), params.topk, params.minp)?;
    let items = aggregator::recommend_by_title(state.provider.as_ref(), &query).await?;
    Ok(Json(items))
}

/// Handler for seen-set recommendations. The body is taken as raw JSON so
/// that malformed optional fields degrade to defaults instead of failing
/// deserialization outright.
pub async fn by_seen(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<Json<Vec<RankedItem>>> {
    let query = SeenSetQuery::from_payload(&payload)?;
    let items = aggregator::recommend_by_seen(state.provider.as_ref(), &query).await?;
    Ok(Json(items))
}
