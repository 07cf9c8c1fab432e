//! Client-side core for the PHP -> Node.js conversion front-end: a state
//! store for the current conversion and the history table, an async
//! coordinator mapping each remote call onto a pending/succeeded/failed
//! lifecycle, and the boundary trait for the remote conversion service.
//! Rendering is someone else's job; views read snapshots and subscribe to
//! change events.

use std::sync::Arc;

use shared::protocol::{ConversionRecord, HistoryQuery};
use tokio::sync::broadcast;
use tracing::debug;

pub mod api;
pub mod filter;
pub mod notice;
pub mod store;
pub mod theme;

pub use api::{ApiClientError, ConversionApi, HttpConversionApi, MissingConversionApi};
pub use filter::HistoryFilter;
pub use notice::{Notice, NoticeSeverity};
pub use store::{
    ConversionStore, ConvertPhase, CurrentConversion, HistoryPhase, HistoryView, StoreSnapshot,
};
pub use theme::{FilePreferenceStore, PreferenceStore, ThemeController};

use notice::NoticeBoard;

/// Emitted whenever a slice of observable state changes; carries the new
/// value of the changed slice.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    ConversionStateChanged(CurrentConversion),
    HistoryStateChanged(HistoryView),
    NoticeChanged(Option<Notice>),
}

/// The core handed to the view layer: store entry points plus the
/// fire-and-forget request triggers. All state lives behind it; there is no
/// other way to mutate.
pub struct ConversionClient {
    api: Arc<dyn ConversionApi>,
    store: ConversionStore,
    notices: NoticeBoard,
    events: broadcast::Sender<ClientEvent>,
}

impl ConversionClient {
    pub fn new(api: Arc<dyn ConversionApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            store: ConversionStore::new(events.clone()),
            notices: NoticeBoard::new(events.clone()),
            api,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot().await
    }

    pub async fn set_input_code(&self, code: impl Into<String>) {
        self.store.set_input_code(code).await;
    }

    pub async fn reset_conversion(&self) {
        self.store.reset_conversion().await;
    }

    pub async fn clear_error(&self) {
        self.store.clear_error().await;
    }

    /// Submits the input for conversion. Empty (or whitespace-only) input
    /// is dropped without touching the store or the network. The outcome is
    /// observed through the snapshot, never returned.
    pub async fn submit_conversion(&self, code: &str) {
        if code.trim().is_empty() {
            debug!("conversion submission suppressed: input is empty");
            return;
        }

        let generation = self.store.begin_conversion().await;
        let phase = match self.api.convert(code).await {
            Ok(record) => ConvertPhase::Succeeded(record),
            Err(err) => ConvertPhase::Failed(err.to_string()),
        };
        self.store.finish_conversion(generation, phase).await;
    }

    /// Fetches one page of history for the given query. Always issues the
    /// request; overlapping fetches resolve in favor of the latest issued
    /// one.
    pub async fn load_history(&self, query: HistoryQuery) {
        let generation = self.store.begin_history_fetch().await;
        let phase = match self.api.fetch_history(&query).await {
            Ok(page) => HistoryPhase::Succeeded(page),
            Err(err) => HistoryPhase::Failed(err.to_string()),
        };
        self.store.finish_history_fetch(generation, phase).await;
    }

    /// Fetches a single record for a detail view. Does not touch store
    /// state.
    pub async fn fetch_record(&self, id: &str) -> Result<ConversionRecord, ApiClientError> {
        self.api.fetch_record(id).await
    }

    pub async fn publish_notice(&self, message: impl Into<String>, severity: NoticeSeverity) {
        self.notices.publish(message, severity).await;
    }

    pub async fn dismiss_notice(&self) {
        self.notices.dismiss().await;
    }

    pub async fn notice(&self) -> Option<Notice> {
        self.notices.current().await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
