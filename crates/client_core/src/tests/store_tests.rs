use super::*;
use shared::domain::ConversionStatus;
use tokio::sync::broadcast;

fn store() -> ConversionStore {
    let (events, _) = broadcast::channel(16);
    ConversionStore::new(events)
}

fn sample_record(id: &str, converted: &str) -> ConversionRecord {
    ConversionRecord {
        id: id.to_string(),
        original_code: "<?php echo 'hi'; ?>".to_string(),
        converted_code: converted.to_string(),
        timestamp: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        status: ConversionStatus::Success,
        error_message: None,
    }
}

fn sample_page(items: Vec<ConversionRecord>, total: u64, page: u32, limit: u32) -> HistoryPage {
    let total_pages = ((total + limit as u64 - 1) / limit as u64) as u32;
    HistoryPage {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}

#[tokio::test]
async fn reset_returns_exact_initial_state_from_any_prior_state() {
    let store = store();
    store.set_input_code("<?php echo 1;").await;
    let generation = store.begin_conversion().await;
    store
        .finish_conversion(generation, ConvertPhase::Failed("conversion failed".to_string()))
        .await;

    store.reset_conversion().await;
    assert_eq!(store.snapshot().await.current, CurrentConversion::default());

    // Idempotent: resetting again changes nothing.
    store.reset_conversion().await;
    assert_eq!(store.snapshot().await.current, CurrentConversion::default());
}

#[tokio::test]
async fn set_input_code_replaces_code_and_clears_error() {
    let store = store();
    let generation = store.begin_conversion().await;
    store
        .finish_conversion(generation, ConvertPhase::Failed("boom".to_string()))
        .await;

    store.set_input_code("<?php echo 2;").await;

    let current = store.snapshot().await.current;
    assert_eq!(current.input_code, "<?php echo 2;");
    assert_eq!(current.error, None);
}

#[tokio::test]
async fn successful_conversion_clears_loading_and_lands_output() {
    let store = store();
    let generation = store.begin_conversion().await;
    assert!(store.snapshot().await.current.is_loading);

    store
        .finish_conversion(
            generation,
            ConvertPhase::Succeeded(sample_record("abc123", "console.log('hi');")),
        )
        .await;

    let current = store.snapshot().await.current;
    assert!(!current.is_loading);
    assert_eq!(current.output_code, "console.log('hi');");
    assert_eq!(current.error, None);
}

#[tokio::test]
async fn failed_conversion_keeps_previous_output_visible() {
    let store = store();
    let generation = store.begin_conversion().await;
    store
        .finish_conversion(
            generation,
            ConvertPhase::Succeeded(sample_record("abc123", "console.log('hi');")),
        )
        .await;

    let generation = store.begin_conversion().await;
    store
        .finish_conversion(generation, ConvertPhase::Failed("parse error".to_string()))
        .await;

    let current = store.snapshot().await.current;
    assert!(!current.is_loading);
    assert_eq!(current.error.as_deref(), Some("parse error"));
    assert_eq!(current.output_code, "console.log('hi');");
}

#[tokio::test]
async fn clear_error_clears_both_slices() {
    let store = store();
    let generation = store.begin_conversion().await;
    store
        .finish_conversion(generation, ConvertPhase::Failed("convert failed".to_string()))
        .await;
    let generation = store.begin_history_fetch().await;
    store
        .finish_history_fetch(generation, HistoryPhase::Failed("fetch failed".to_string()))
        .await;

    store.clear_error().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.current.error, None);
    assert_eq!(snapshot.history.error, None);

    // No-op when already clear.
    store.clear_error().await;
    assert_eq!(store.snapshot().await, snapshot);
}

#[tokio::test]
async fn empty_history_page_is_distinct_from_loading_state() {
    let store = store();
    let generation = store.begin_history_fetch().await;
    let loading = store.snapshot().await.history;
    assert!(loading.is_loading);

    store
        .finish_history_fetch(
            generation,
            HistoryPhase::Succeeded(sample_page(Vec::new(), 0, 1, 10)),
        )
        .await;

    let loaded = store.snapshot().await.history;
    assert!(!loaded.is_loading);
    assert!(loaded.items.is_empty());
    assert_eq!(loaded.total, 0);
    assert_ne!(loading, loaded);
}

#[tokio::test]
async fn history_failure_keeps_last_known_page() {
    let store = store();
    let generation = store.begin_history_fetch().await;
    let items = vec![sample_record("a", "one()"), sample_record("b", "two()")];
    store
        .finish_history_fetch(generation, HistoryPhase::Succeeded(sample_page(items, 12, 2, 5)))
        .await;

    let generation = store.begin_history_fetch().await;
    store
        .finish_history_fetch(generation, HistoryPhase::Failed("fetch failed".to_string()))
        .await;

    let history = store.snapshot().await.history;
    assert_eq!(history.error.as_deref(), Some("fetch failed"));
    assert_eq!(history.items.len(), 2);
    assert_eq!(history.page, 2);
    assert_eq!(history.total, 12);
    assert_eq!(history.total_pages, 3);
}

#[tokio::test]
async fn stale_conversion_result_is_discarded() {
    let store = store();
    let first = store.begin_conversion().await;
    let second = store.begin_conversion().await;

    store
        .finish_conversion(second, ConvertPhase::Succeeded(sample_record("b", "two()")))
        .await;
    store
        .finish_conversion(first, ConvertPhase::Succeeded(sample_record("a", "one()")))
        .await;

    let current = store.snapshot().await.current;
    assert_eq!(current.output_code, "two()");
    assert!(!current.is_loading);
}

#[tokio::test]
async fn result_resolved_after_reset_is_discarded() {
    let store = store();
    let generation = store.begin_conversion().await;
    store.reset_conversion().await;

    store
        .finish_conversion(generation, ConvertPhase::Succeeded(sample_record("a", "one()")))
        .await;

    assert_eq!(store.snapshot().await.current, CurrentConversion::default());
}

#[tokio::test]
async fn mutations_emit_the_changed_slice() {
    let (events, mut rx) = broadcast::channel(16);
    let store = ConversionStore::new(events);

    store.set_input_code("<?php echo 3;").await;

    match rx.recv().await.expect("event") {
        ClientEvent::ConversionStateChanged(current) => {
            assert_eq!(current.input_code, "<?php echo 3;");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
