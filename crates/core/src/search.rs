//! Debounced suggestions and full-text search with "latest request wins".
//!
//! Every input takes a ticket from a [`RequestSequence`]. A ticket that is no
//! longer the newest after the debounce delay, or after its fetch returns,
//! is dropped without touching the published state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::domain::product::Product;
use crate::gateway::{CatalogReader, GatewayError};
use crate::suggestions::{
    Suggestion, SuggestionMatcher, DEFAULT_DEBOUNCE_MS, DEFAULT_SUGGESTION_LIMIT, MIN_QUERY_CHARS,
};

#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestSequence {
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub suggestion_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_chars: MIN_QUERY_CHARS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_chars: config.min_query_chars,
            suggestion_limit: config.suggestion_limit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestionUpdate {
    Applied(Vec<Suggestion>),
    /// A newer input arrived first; nothing was published.
    Superseded,
}

/// Autocomplete state behind a search box.
pub struct SuggestionBox {
    gateway: Arc<dyn CatalogReader>,
    matcher: SuggestionMatcher,
    settings: SearchSettings,
    sequence: RequestSequence,
    current: watch::Sender<Vec<Suggestion>>,
}

impl SuggestionBox {
    pub fn new(gateway: Arc<dyn CatalogReader>, settings: SearchSettings) -> Self {
        let (current, _) = watch::channel(Vec::new());
        Self {
            gateway,
            matcher: SuggestionMatcher::new(settings.min_query_chars),
            settings,
            sequence: RequestSequence::default(),
            current,
        }
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.current.subscribe()
    }

    /// Handles one keystroke's worth of text.
    ///
    /// Waits out the debounce delay, then looks up candidates unless the
    /// query is below the length threshold. A failed lookup publishes an
    /// empty list.
    pub async fn input(&self, text: &str) -> SuggestionUpdate {
        let ticket = self.sequence.issue();
        tokio::time::sleep(self.settings.debounce).await;

        if !self.sequence.is_current(ticket) {
            debug!(
                event_name = "search.suggestions.coalesced",
                ticket = ticket.0,
                "input superseded during debounce"
            );
            return SuggestionUpdate::Superseded;
        }

        let query = text.trim();
        if !self.matcher.accepts(query) {
            return self.publish(ticket, Vec::new());
        }

        let candidates =
            match self.gateway.search_products(query, Some(self.settings.suggestion_limit)).await {
                Ok(candidates) => candidates,
                Err(error) => {
                    warn!(
                        event_name = "search.suggestions.fetch_failed",
                        error_class = error.class(),
                        error = %error,
                        "suggestion lookup failed; showing no suggestions"
                    );
                    Vec::new()
                }
            };

        let suggestions = self.matcher.suggest(query, &candidates);
        self.publish(ticket, suggestions)
    }

    /// Drops pending lookups and empties the list, e.g. after a submit.
    pub fn clear(&self) {
        let _ = self.sequence.issue();
        self.current.send_replace(Vec::new());
    }

    fn publish(&self, ticket: RequestTicket, suggestions: Vec<Suggestion>) -> SuggestionUpdate {
        if !self.sequence.is_current(ticket) {
            debug!(
                event_name = "search.suggestions.stale_response",
                ticket = ticket.0,
                "discarding suggestions for a superseded input"
            );
            return SuggestionUpdate::Superseded;
        }

        self.current.send_replace(suggestions.clone());
        SuggestionUpdate::Applied(suggestions)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    pub term: String,
    pub results: Vec<Product>,
    pub loading: bool,
    pub error: Option<GatewayError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Results(Vec<Product>),
    Failed(GatewayError),
    Superseded,
}

/// Results page for a submitted search term.
pub struct SearchSession {
    gateway: Arc<dyn CatalogReader>,
    sequence: RequestSequence,
    state: watch::Sender<SearchState>,
}

impl SearchSession {
    pub fn new(gateway: Arc<dyn CatalogReader>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self { gateway, sequence: RequestSequence::default(), state }
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub async fn search(&self, term: &str) -> SearchOutcome {
        let ticket = self.sequence.issue();
        let term = term.trim().to_string();

        if term.is_empty() {
            self.state.send_replace(SearchState::default());
            return SearchOutcome::Results(Vec::new());
        }

        self.state.send_modify(|state| {
            state.term = term.clone();
            state.loading = true;
            state.error = None;
        });

        let fetched = self.gateway.search_products(&term, None).await;
        if !self.sequence.is_current(ticket) {
            debug!(
                event_name = "search.results.stale_response",
                ticket = ticket.0,
                term = %term,
                "discarding results for a superseded search"
            );
            return SearchOutcome::Superseded;
        }

        match fetched {
            Ok(results) => {
                self.state.send_replace(SearchState {
                    term,
                    results: results.clone(),
                    loading: false,
                    error: None,
                });
                SearchOutcome::Results(results)
            }
            Err(error) => {
                warn!(
                    event_name = "search.results.fetch_failed",
                    error_class = error.class(),
                    error = %error,
                    "search request failed"
                );
                self.state.send_replace(SearchState {
                    term,
                    results: Vec::new(),
                    loading: false,
                    error: Some(error.clone()),
                });
                SearchOutcome::Failed(error)
            }
        }
    }

    pub fn clear(&self) {
        let _ = self.sequence.issue();
        self.state.send_replace(SearchState::default());
    }
}
