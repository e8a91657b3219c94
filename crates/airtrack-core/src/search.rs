// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Airtrack contributors

//! Airport search box: query text, suggestions, selection.
//!
//! [`SearchState`] is the plain state container with the recognized
//! transitions (query changed, suggestions received, item selected, list
//! dismissed). [`AutocompleteSession`] drives it from keystrokes on a tokio
//! runtime, debouncing lookups and applying only the newest response.

use crate::airport::Airport;
use crate::api::{AirportApi, ApiError};
use crate::sequence::{RequestId, RequestSequencer};
use log::{debug, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const MIN_QUERY_LEN: usize = 2;
pub const DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: DEBOUNCE,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

/// Outcome of a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    /// Query too short; suggestions cleared and no lookup will be made.
    Cleared,
    /// Query long enough; a lookup should follow once input settles.
    Pending,
    /// Trimmed text did not change.
    Unchanged,
}

/// Read-only copy of the search box for renderers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub suggestions: Vec<Airport>,
    pub loading: bool,
    pub open: bool,
    pub selected: Option<Airport>,
}

#[derive(Debug)]
pub struct SearchState {
    query: String,
    suggestions: Vec<Airport>,
    loading: bool,
    open: bool,
    selected: Option<Airport>,
    min_query_len: usize,
    requests: RequestSequencer,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(MIN_QUERY_LEN)
    }
}

impl SearchState {
    pub fn new(min_query_len: usize) -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            loading: false,
            open: false,
            selected: None,
            min_query_len,
            requests: RequestSequencer::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Airport] {
        &self.suggestions
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<&Airport> {
        self.selected.as_ref()
    }

    fn is_searchable(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }

    fn close(&mut self) {
        self.suggestions.clear();
        self.open = false;
        self.loading = false;
        self.requests.invalidate();
    }

    pub fn query_changed(&mut self, text: &str) -> QueryChange {
        let text = text.trim();
        if text == self.query {
            return QueryChange::Unchanged;
        }

        self.query = text.to_string();
        self.selected = None;
        self.close();

        if self.is_searchable(text) {
            QueryChange::Pending
        } else {
            QueryChange::Cleared
        }
    }

    /// Issues a lookup for `query` if it is still what the box shows.
    pub fn begin_lookup(&mut self, query: &str) -> Option<RequestId> {
        let query = query.trim();
        if query != self.query || !self.is_searchable(query) || self.selected.is_some() {
            return None;
        }
        self.loading = true;
        Some(self.requests.issue())
    }

    /// Applies a lookup result. Returns `false` if the response was stale.
    pub fn suggestions_received(
        &mut self,
        id: RequestId,
        result: Result<Vec<Airport>, ApiError>,
    ) -> bool {
        if !self.requests.accept(id) {
            debug!("Discarding stale autocomplete response; request={}", id);
            return false;
        }

        self.loading = false;
        match result {
            Ok(airports) => {
                debug!(
                    "Autocomplete results applied; request={} query={:?} count={}",
                    id,
                    self.query,
                    airports.len()
                );
                self.open = !airports.is_empty();
                self.suggestions = airports;
            }
            Err(e) => {
                warn!("Autocomplete lookup failed; query={:?} error={}", self.query, e);
                self.suggestions.clear();
                self.open = false;
            }
        }
        true
    }

    pub fn select(&mut self, index: usize) -> Option<Airport> {
        let airport = self.suggestions.get(index)?.clone();
        self.close();
        self.query = airport.name.clone();
        self.selected = Some(airport.clone());
        Some(airport)
    }

    /// Hides the list (click outside the search box).
    pub fn dismiss(&mut self) {
        self.close();
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.clone(),
            suggestions: self.suggestions.clone(),
            loading: self.loading,
            open: self.open,
            selected: self.selected.clone(),
        }
    }
}

struct Shared {
    state: Mutex<SearchState>,
    updates: watch::Sender<SearchSnapshot>,
}

impl Shared {
    fn update<R>(&self, f: impl FnOnce(&mut SearchState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);
        self.updates.send_replace(state.snapshot());
        result
    }

    fn read<R>(&self, f: impl FnOnce(&SearchState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

/// Debounced autocomplete bound to an [`AirportApi`].
///
/// Must be created inside a tokio runtime. Dropping the session stops the
/// debounce task; lookups already sent still complete but are harmless.
pub struct AutocompleteSession {
    shared: Arc<Shared>,
    input_tx: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl AutocompleteSession {
    pub fn spawn(api: Arc<dyn AirportApi>, settings: SearchSettings) -> Self {
        let state = SearchState::new(settings.min_query_len);
        let (updates, _) = watch::channel(state.snapshot());
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            updates,
        });

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(debounce_loop(
            Arc::clone(&shared),
            api,
            input_rx,
            settings.debounce,
        ));

        Self {
            shared,
            input_tx,
            worker,
        }
    }

    pub fn input(&self, text: &str) -> QueryChange {
        let (change, query) = self
            .shared
            .update(|s| (s.query_changed(text), s.query().to_string()));
        if change == QueryChange::Pending {
            if self.input_tx.send(query).is_err() {
                warn!("Autocomplete worker is gone; input dropped");
            }
        }
        change
    }

    pub fn select(&self, index: usize) -> Option<Airport> {
        self.shared.update(|s| s.select(index))
    }

    pub fn dismiss(&self) {
        self.shared.update(SearchState::dismiss)
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.read(SearchState::snapshot)
    }

    /// Receives a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.updates.subscribe()
    }
}

impl Drop for AutocompleteSession {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn debounce_loop(
    shared: Arc<Shared>,
    api: Arc<dyn AirportApi>,
    mut input_rx: mpsc::UnboundedReceiver<String>,
    delay: Duration,
) {
    while let Some(mut query) = input_rx.recv().await {
        // wait for `delay` of silence, restarting on every keystroke
        loop {
            match tokio::time::timeout(delay, input_rx.recv()).await {
                Ok(Some(newer)) => query = newer,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        let Some(id) = shared.update(|s| s.begin_lookup(&query)) else {
            continue;
        };
        debug!("Autocomplete lookup issued; request={} query={:?}", id, query);

        let shared = Arc::clone(&shared);
        let api = Arc::clone(&api);
        tokio::spawn(async move {
            let result = api.autocomplete(&query).await;
            shared.update(|s| s.suggestions_received(id, result));
        });
    }
}
