//! Upstream recommendation backend abstraction.
//!
//! The aggregation layer only talks to the backend through this trait, so
//! tests (and any offline dataset) can substitute a stub behind the same
//! interface without touching the aggregation code.

use crate::{
    error::AppResult,
    models::{RawCandidate, TitlePage},
    services::aggregator::{SeenSetQuery, TitleRecsQuery, TitleSearchQuery},
};

pub mod http;

pub use http::HttpProvider;

/// Trait for upstream recommendation sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Title search/listing for the picker, `{ count, results }` shaped.
    async fn search_titles(&self, query: &TitleSearchQuery) -> AppResult<TitlePage>;

    /// Raw candidates similar to a single title.
    async fn recommend_for_title(&self, query: &TitleRecsQuery) -> AppResult<Vec<RawCandidate>>;

    /// Raw candidates derived from a seen-set.
    async fn recommend_for_seen(&self, query: &SeenSetQuery) -> AppResult<Vec<RawCandidate>>;
}
