use std::{path::Path, sync::Arc};

use client_core::{IndexSource, UiStateController};
use counter_service::{CounterServiceHandle, CounterServiceTask};
use shared::{
    domain::{CounterValue, MessageCatalog, MessageIndex},
    protocol::SETTINGS_STORE_ID,
};
use storage::{Storage, StoreRegistry};

struct Always(usize);

impl IndexSource for Always {
    fn next_index(&self, _len: usize) -> usize {
        self.0
    }
}

fn catalog() -> MessageCatalog {
    MessageCatalog::new(["A", "B", "C"]).expect("catalog")
}

async fn counter_at(value: i64) -> (CounterServiceHandle, CounterServiceTask) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_count(CounterValue(value)).await.expect("seed");
    counter_service::spawn(storage)
}

fn session(
    settings_dir: &Path,
    counter: &CounterServiceHandle,
    pick: usize,
) -> UiStateController {
    UiStateController::new(
        catalog(),
        Arc::new(counter.clone()),
        Arc::new(StoreRegistry::new(settings_dir)),
    )
    .with_index_source(Always(pick))
}

#[tokio::test]
async fn message_choice_survives_restart_through_settings_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join(SETTINGS_STORE_ID),
        r#"{ "messageIndex": 2 }"#,
    )
    .expect("seed settings");
    let (counter, task) = counter_at(0).await;

    let first = session(dir.path(), &counter, 0);
    first.initialize().await.expect("init").into_result().expect("ready");
    assert_eq!(first.message_text(), "C");

    first.request_random_message().wait().await.expect("persisted");
    assert_eq!(first.message_text(), "A");
    drop(first);

    let restarted = session(dir.path(), &counter, 0);
    restarted.initialize().await.expect("init");
    assert_eq!(restarted.snapshot().message_index, MessageIndex(0));
    assert_eq!(restarted.message_text(), "A");

    task.shutdown().await;
}

#[tokio::test]
async fn counter_scenario_against_running_service() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (counter, task) = counter_at(5).await;
    let controller = session(dir.path(), &counter, 0);

    let report = controller.initialize().await.expect("init");
    assert_eq!(report.counter.expect("counter"), CounterValue(5));
    assert_eq!(
        report.message_index.expect("first run uses default"),
        MessageIndex::DEFAULT
    );

    assert_eq!(controller.increment().await.expect("inc"), CounterValue(6));
    assert_eq!(controller.increment().await.expect("inc"), CounterValue(7));
    assert_eq!(controller.decrement().await.expect("dec"), CounterValue(6));
    assert_eq!(controller.reset().await.expect("reset"), CounterValue(0));
    assert_eq!(counter.get().await.expect("service value"), CounterValue(0));

    task.shutdown().await;
}

#[tokio::test]
async fn stopped_service_surfaces_as_collaborator_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (counter, task) = counter_at(3).await;
    let controller = session(dir.path(), &counter, 1);
    controller.initialize().await.expect("init");
    task.shutdown().await;

    let err = controller.increment().await.expect_err("service stopped");
    assert!(err.is_collaborator_unavailable());
    assert_eq!(controller.snapshot().counter, Some(CounterValue(3)));

    // The message slice is independent of the counter.
    controller.request_random_message().wait().await.expect("persisted");
    assert_eq!(controller.message_text(), "B");
}
