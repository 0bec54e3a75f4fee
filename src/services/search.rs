//! Debounced, cancellable incremental title search.
//!
//! Drives a picker UI: each keystroke calls [`SearchController::on_input`],
//! which restarts a debounce timer and supersedes any pending request. A
//! monotonically increasing generation token guards every state write, so a
//! response that lost the race can never overwrite results belonging to a
//! newer input. One controller manages one logical search session and lives
//! as long as the session does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::models::TitleEntry;
use crate::services::aggregator::TitleSearchQuery;
use crate::services::providers::RecommendationProvider;

/// Delay between the last keystroke and the outbound search request.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

/// Inputs shorter than this never trigger a request; the result set is
/// cleared instead.
pub const MIN_QUERY_LEN: usize = 2;

/// How many suggestions to request per search.
pub const DEFAULT_SUGGESTION_LIMIT: u32 = 50;

/// Phase of the current logical search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No search pending; input below the length threshold.
    Idle,
    /// Waiting out the debounce delay.
    Debouncing,
    /// Request issued, response pending.
    InFlight,
    /// Results for the latest input are visible.
    Settled,
    /// Pending work was explicitly cancelled.
    Cancelled,
    /// The latest request failed; result set is empty.
    Failed,
}

struct Shared {
    generation: AtomicU64,
    phase: RwLock<SearchPhase>,
    results: RwLock<Vec<TitleEntry>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            phase: RwLock::new(SearchPhase::Idle),
            results: RwLock::new(Vec::new()),
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }
}

pub struct SearchController {
    provider: Arc<dyn RecommendationProvider>,
    debounce: Duration,
    limit: u32,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn RecommendationProvider>) -> Self {
        Self::with_debounce(provider, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(provider: Arc<dyn RecommendationProvider>, debounce: Duration) -> Self {
        Self {
            provider,
            debounce,
            limit: DEFAULT_SUGGESTION_LIMIT,
            shared: Arc::new(Shared::new()),
            task: None,
        }
    }

    /// Feeds a new input value into the controller, superseding any pending
    /// timer or in-flight request.
    pub async fn on_input(&mut self, input: &str) {
        // Invalidate whatever was pending; a stale task that already passed
        // its abort point still sees the bumped generation and backs off.
        let token = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let query = input.trim().to_string();
        if query.chars().count() < MIN_QUERY_LEN {
            *self.shared.results.write().await = Vec::new();
            *self.shared.phase.write().await = SearchPhase::Idle;
            return;
        }

        *self.shared.phase.write().await = SearchPhase::Debouncing;

        let shared = Arc::clone(&self.shared);
        let provider = Arc::clone(&self.provider);
        let debounce = self.debounce;
        let limit = self.limit;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            run_search(shared, provider, token, query, limit).await;
        }));
    }

    /// Cancels any pending search, e.g. when the picker closes.
    pub async fn cancel(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            *self.shared.phase.write().await = SearchPhase::Cancelled;
        }
    }

    /// Results of the most recent completed search for the most recent
    /// input.
    pub async fn results(&self) -> Vec<TitleEntry> {
        self.shared.results.read().await.clone()
    }

    pub async fn phase(&self) -> SearchPhase {
        *self.shared.phase.read().await
    }
}

/// Issues the search for `token` and applies the outcome only if `token` is
/// still the latest generation. Errors are swallowed into an empty result
/// set; nothing here panics or propagates.
async fn run_search(
    shared: Arc<Shared>,
    provider: Arc<dyn RecommendationProvider>,
    token: u64,
    query: String,
    limit: u32,
) {
    if !shared.is_current(token) {
        return;
    }
    *shared.phase.write().await = SearchPhase::InFlight;

    let search = TitleSearchQuery::new(Some(&query), Some(limit as i64), None, None, None);
    let outcome = provider.search_titles(&search).await;

    // A newer input arrived while the request was in flight: the response
    // is stale and must not touch visible state.
    if !shared.is_current(token) {
        return;
    }

    match outcome {
        Ok(page) => {
            *shared.results.write().await = page.results;
            *shared.phase.write().await = SearchPhase::Settled;
        }
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "Title search failed");
            *shared.results.write().await = Vec::new();
            *shared.phase.write().await = SearchPhase::Failed;
        }
    }
}
