use super::*;
use shared::error::ErrorCode;

async fn memory_service() -> (CounterServiceHandle, CounterServiceTask) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    spawn(storage)
}

#[tokio::test]
async fn follows_increment_decrement_reset_sequence() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_count(CounterValue(5)).await.expect("seed");
    let (handle, task) = spawn(storage);

    assert_eq!(handle.get().await.expect("get"), CounterValue(5));
    assert_eq!(handle.increment().await.expect("inc"), CounterValue(6));
    assert_eq!(handle.increment().await.expect("inc"), CounterValue(7));
    assert_eq!(handle.decrement().await.expect("dec"), CounterValue(6));
    assert_eq!(handle.reset().await.expect("reset"), CounterValue(0));

    task.shutdown().await;
}

#[tokio::test]
async fn get_does_not_mutate() {
    let (handle, task) = memory_service().await;
    handle.increment().await.expect("inc");
    for _ in 0..3 {
        assert_eq!(handle.get().await.expect("get"), CounterValue(1));
    }
    task.shutdown().await;
}

#[tokio::test]
async fn increment_then_get_is_one_more_for_negative_start() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_count(CounterValue(-7)).await.expect("seed");
    let (handle, task) = spawn(storage);

    let before = handle.get().await.expect("get");
    handle.increment().await.expect("inc");
    let after = handle.get().await.expect("get");
    assert_eq!(after.0, before.0 + 1);

    task.shutdown().await;
}

#[tokio::test]
async fn concurrent_callers_all_get_answers() {
    let (handle, task) = memory_service().await;

    let calls: Vec<_> = (0..10)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.increment().await })
        })
        .collect();
    let mut seen = Vec::new();
    for call in calls {
        seen.push(call.await.expect("join").expect("inc").0);
    }
    seen.sort_unstable();

    assert_eq!(seen, (1..=10).collect::<Vec<_>>());
    task.shutdown().await;
}

#[tokio::test]
async fn calls_after_shutdown_report_unavailable() {
    let (handle, task) = memory_service().await;
    assert!(handle.is_running());
    task.shutdown().await;

    let err = handle.get().await.expect_err("service stopped");
    assert_eq!(err.code, ErrorCode::Unavailable);
    assert!(!handle.is_running());
}

#[tokio::test]
async fn start_opens_configured_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings::for_data_dir(&dir.path().join("data"));

    let (handle, task) = start(&settings).await.expect("start");
    assert_eq!(handle.increment().await.expect("inc"), CounterValue(1));
    task.shutdown().await;

    let (handle, task) = start(&settings).await.expect("restart");
    assert_eq!(handle.get().await.expect("get"), CounterValue(1));
    task.shutdown().await;
}
