use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::TitlePage,
    services::aggregator::{self, TitleSearchQuery},
    state::AppState,
};

/// Query parameters for title search/listing. Both `q` and `s` are accepted
/// for the search text; without either, the upstream returns an alphabetical
/// listing page.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    s: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    min_r: Option<i64>,
    minp: Option<f64>,
}

/// Handler for title search/listing endpoint
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<TitlePage>> {
    let query = TitleSearchQuery::new(
        params.q.or(params.s).as_deref(),
        params.limit,
        params.offset,
        params.min_r,
        params.minp,
    );
    let page = aggregator::search_titles(state.provider.as_ref(), &query).await?;
    Ok(Json(page))
}
