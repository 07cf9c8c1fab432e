//! Transient confirmation notices ("Code copied to clipboard!"). A notice
//! clears itself after a fixed delay; publishing a new one replaces the
//! pending clear, so at most one timer is ever outstanding.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};

use crate::ClientEvent;

pub const NOTICE_CLEAR_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: NoticeSeverity,
}

struct NoticeState {
    notice: Option<Notice>,
    clear_task: Option<JoinHandle<()>>,
    // Stamped into each scheduled clear; a clear only fires if its stamp is
    // still current, covering the window where an aborted task already woke.
    sequence: u64,
}

struct NoticeInner {
    state: Mutex<NoticeState>,
    events: broadcast::Sender<ClientEvent>,
}

pub(crate) struct NoticeBoard {
    inner: Arc<NoticeInner>,
}

impl NoticeBoard {
    pub(crate) fn new(events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            inner: Arc::new(NoticeInner {
                state: Mutex::new(NoticeState {
                    notice: None,
                    clear_task: None,
                    sequence: 0,
                }),
                events,
            }),
        }
    }

    pub(crate) async fn publish(&self, message: impl Into<String>, severity: NoticeSeverity) {
        let notice = Notice {
            message: message.into(),
            severity,
        };

        let mut state = self.inner.state.lock().await;
        if let Some(task) = state.clear_task.take() {
            task.abort();
        }
        state.sequence += 1;
        let sequence = state.sequence;
        state.notice = Some(notice.clone());
        let _ = self
            .inner
            .events
            .send(ClientEvent::NoticeChanged(Some(notice)));

        let inner = Arc::clone(&self.inner);
        state.clear_task = Some(tokio::spawn(async move {
            tokio::time::sleep(NOTICE_CLEAR_DELAY).await;
            let mut state = inner.state.lock().await;
            if state.sequence != sequence {
                return;
            }
            state.notice = None;
            state.clear_task = None;
            let _ = inner.events.send(ClientEvent::NoticeChanged(None));
        }));
    }

    pub(crate) async fn dismiss(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(task) = state.clear_task.take() {
            task.abort();
        }
        state.sequence += 1;
        if state.notice.take().is_some() {
            let _ = self.inner.events.send(ClientEvent::NoticeChanged(None));
        }
    }

    pub(crate) async fn current(&self) -> Option<Notice> {
        self.inner.state.lock().await.notice.clone()
    }
}

#[cfg(test)]
#[path = "tests/notice_tests.rs"]
mod tests;
