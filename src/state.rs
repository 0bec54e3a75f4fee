use std::sync::Arc;

use crate::services::providers::RecommendationProvider;

/// Shared application state
///
/// Handlers are stateless beyond the provider handle; aggregator calls hold
/// no mutable state and are safe to run concurrently.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn RecommendationProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn RecommendationProvider>) -> Self {
        Self { provider }
    }
}
