use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use samplewatch::resource::mock::MemoryResource;
use samplewatch::watch::{Notification, WatchController};
use samplewatch_test_utils::builders::WatchSettingsBuilder;
use samplewatch_test_utils::{drain_for, init_tracing, next_notification};

fn settings() -> samplewatch::watch::WatchSettings {
    WatchSettingsBuilder::new()
        .watch_interval_ms(100)
        .max_delta_ms(60_000)
        .build()
}

#[tokio::test(start_paused = true)]
async fn metadata_change_does_not_rebaseline() {
    init_tracing();

    // Smaller than one block: comparisons are exact.
    let res = MemoryResource::patterned(2000);
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = WatchController::new(tx);
    controller.start(Arc::new(res.clone()), settings()).await.unwrap();

    res.touch();
    assert_eq!(
        next_notification(&mut rx, Duration::from_secs(1)).await,
        Notification::ChangedMetadata
    );
    let quiet = drain_for(&mut rx, Duration::from_millis(500)).await;
    assert!(quiet.is_empty(), "unexpected notifications: {quiet:?}");

    // Byte change without a timestamp change: caught by the (old) baseline.
    res.flip(1234);
    assert_eq!(
        next_notification(&mut rx, Duration::from_secs(1)).await,
        Notification::ChangedContent
    );
    let quiet = drain_for(&mut rx, Duration::from_millis(500)).await;
    assert!(quiet.is_empty(), "baseline was not refreshed: {quiet:?}");

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn bytes_changed_together_with_timestamp_surface_later() {
    init_tracing();

    let res = MemoryResource::patterned(2000);
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = WatchController::new(tx);
    controller.start(Arc::new(res.clone()), settings()).await.unwrap();

    // Both the timestamp and the bytes change. The first tick only reports
    // metadata; the stale baseline then reports the content on the next one.
    let mut changed = vec![0u8; 2000];
    changed[0] = 1;
    res.set_contents(changed);

    assert_eq!(
        next_notification(&mut rx, Duration::from_secs(1)).await,
        Notification::ChangedMetadata
    );
    assert_eq!(
        next_notification(&mut rx, Duration::from_secs(1)).await,
        Notification::ChangedContent
    );

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn size_change_is_a_content_change() {
    init_tracing();

    let res = MemoryResource::patterned(100_000);
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = WatchController::new(tx);
    controller.start(Arc::new(res.clone()), settings()).await.unwrap();

    // A size change always comes with a new timestamp, so the metadata
    // notification comes first and the size check fires on the next tick.
    res.set_contents(vec![7u8; 100_001]);
    assert_eq!(
        next_notification(&mut rx, Duration::from_secs(1)).await,
        Notification::ChangedMetadata
    );
    assert_eq!(
        next_notification(&mut rx, Duration::from_secs(1)).await,
        Notification::ChangedContent
    );

    controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_session() {
    init_tracing();

    let first = MemoryResource::patterned(2000);
    let second = MemoryResource::patterned(3000);
    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = WatchController::new(tx);

    controller.start(Arc::new(first.clone()), settings()).await.unwrap();
    controller.start(Arc::new(second.clone()), settings()).await.unwrap();
    assert!(controller.is_watching());

    let before = first.snapshots();
    first.flip(0);
    let quiet = drain_for(&mut rx, Duration::from_millis(500)).await;
    assert!(quiet.is_empty());
    assert_eq!(first.snapshots(), before);

    second.flip(0);
    assert_eq!(
        next_notification(&mut rx, Duration::from_secs(1)).await,
        Notification::ChangedContent
    );

    controller.stop().await;
}
