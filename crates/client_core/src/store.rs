//! Single source of truth for UI-observable conversion state. All mutation
//! goes through the declared operations; every applied mutation emits the
//! changed slice on the event channel.

use shared::protocol::{ConversionRecord, HistoryPage};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::ClientEvent;

/// Identifies the most recently issued request of one kind, so that results
/// of superseded requests can be discarded instead of clobbering newer
/// state.
pub type RequestGeneration = u64;

/// State of the conversion currently shown in the editors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrentConversion {
    pub input_code: String,
    pub output_code: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// State of the history table: one fetched page plus the pagination values
/// echoed by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub items: Vec<ConversionRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for HistoryView {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            limit: 10,
            total_pages: 0,
            is_loading: false,
            error: None,
        }
    }
}

/// Immutable read of the whole store at a point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreSnapshot {
    pub current: CurrentConversion,
    pub history: HistoryView,
}

/// Lifecycle of one conversion request.
#[derive(Debug, Clone)]
pub enum ConvertPhase {
    Pending,
    Succeeded(ConversionRecord),
    Failed(String),
}

/// Lifecycle of one history fetch.
#[derive(Debug, Clone)]
pub enum HistoryPhase {
    Pending,
    Succeeded(HistoryPage),
    Failed(String),
}

impl CurrentConversion {
    fn apply(&mut self, phase: ConvertPhase) {
        match phase {
            ConvertPhase::Pending => {
                self.is_loading = true;
                self.error = None;
            }
            ConvertPhase::Succeeded(record) => {
                self.is_loading = false;
                self.output_code = record.converted_code;
            }
            ConvertPhase::Failed(message) => {
                // Previous output stays visible alongside the error.
                self.is_loading = false;
                self.error = Some(message);
            }
        }
    }
}

impl HistoryView {
    fn apply(&mut self, phase: HistoryPhase) {
        match phase {
            HistoryPhase::Pending => {
                self.is_loading = true;
                self.error = None;
            }
            HistoryPhase::Succeeded(page) => {
                self.items = page.items;
                self.total = page.total;
                self.page = page.page;
                self.limit = page.limit;
                self.total_pages = page.total_pages;
                self.is_loading = false;
            }
            HistoryPhase::Failed(message) => {
                // Items and pagination keep their last-known values.
                self.is_loading = false;
                self.error = Some(message);
            }
        }
    }
}

struct StoreState {
    current: CurrentConversion,
    history: HistoryView,
    convert_generation: RequestGeneration,
    history_generation: RequestGeneration,
}

pub struct ConversionStore {
    inner: Mutex<StoreState>,
    events: broadcast::Sender<ClientEvent>,
}

impl ConversionStore {
    pub(crate) fn new(events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            inner: Mutex::new(StoreState {
                current: CurrentConversion::default(),
                history: HistoryView::default(),
                convert_generation: 0,
                history_generation: 0,
            }),
            events,
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.inner.lock().await;
        StoreSnapshot {
            current: state.current.clone(),
            history: state.history.clone(),
        }
    }

    pub async fn set_input_code(&self, code: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.current.input_code = code.into();
        state.current.error = None;
        self.emit_current(&state);
    }

    /// Restores the current-conversion slice to its initial value. Also
    /// advances the conversion generation: a request still in flight when
    /// the reset happens must not resurrect its output afterwards.
    pub async fn reset_conversion(&self) {
        let mut state = self.inner.lock().await;
        state.convert_generation += 1;
        state.current = CurrentConversion::default();
        self.emit_current(&state);
    }

    pub async fn clear_error(&self) {
        let mut state = self.inner.lock().await;
        let current_had_error = state.current.error.take().is_some();
        let history_had_error = state.history.error.take().is_some();
        if current_had_error {
            self.emit_current(&state);
        }
        if history_had_error {
            self.emit_history(&state);
        }
    }

    pub(crate) async fn begin_conversion(&self) -> RequestGeneration {
        let mut state = self.inner.lock().await;
        state.convert_generation += 1;
        let generation = state.convert_generation;
        state.current.apply(ConvertPhase::Pending);
        self.emit_current(&state);
        generation
    }

    pub(crate) async fn finish_conversion(
        &self,
        generation: RequestGeneration,
        phase: ConvertPhase,
    ) {
        let mut state = self.inner.lock().await;
        if generation != state.convert_generation {
            debug!(
                generation,
                latest = state.convert_generation,
                "discarding stale conversion result"
            );
            return;
        }
        state.current.apply(phase);
        self.emit_current(&state);
    }

    pub(crate) async fn begin_history_fetch(&self) -> RequestGeneration {
        let mut state = self.inner.lock().await;
        state.history_generation += 1;
        let generation = state.history_generation;
        state.history.apply(HistoryPhase::Pending);
        self.emit_history(&state);
        generation
    }

    pub(crate) async fn finish_history_fetch(
        &self,
        generation: RequestGeneration,
        phase: HistoryPhase,
    ) {
        let mut state = self.inner.lock().await;
        if generation != state.history_generation {
            debug!(
                generation,
                latest = state.history_generation,
                "discarding stale history page"
            );
            return;
        }
        state.history.apply(phase);
        self.emit_history(&state);
    }

    fn emit_current(&self, state: &StoreState) {
        let _ = self
            .events
            .send(ClientEvent::ConversionStateChanged(state.current.clone()));
    }

    fn emit_history(&self, state: &StoreState) {
        let _ = self
            .events
            .send(ClientEvent::HistoryStateChanged(state.history.clone()));
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
