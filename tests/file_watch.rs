use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use samplewatch::resource::FileResource;
use samplewatch::watch::{Notification, WatchController};
use samplewatch_test_utils::builders::WatchSettingsBuilder;
use samplewatch_test_utils::{init_tracing, next_notification, with_timeout};

#[tokio::test]
async fn watches_a_real_file() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watched.bin");
    let bytes: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
    std::fs::write(&path, &bytes).unwrap();

    let (tx, mut rx) = mpsc::channel(16);
    let mut controller = WatchController::new(tx);
    let settings = WatchSettingsBuilder::new()
        .watch_interval_ms(20)
        .max_delta_ms(60_000)
        .build();
    controller
        .start(Arc::new(FileResource::new(&path)), settings)
        .await
        .unwrap();

    // Rewrite the whole file with different bytes.
    tokio::time::sleep(Duration::from_millis(50)).await;
    std::fs::write(&path, vec![0u8; 100_000]).unwrap();

    let first = next_notification(&mut rx, Duration::from_secs(2)).await;
    assert!(
        matches!(
            first,
            Notification::ChangedMetadata | Notification::ChangedContent
        ),
        "unexpected {first:?}"
    );

    // Removing the file is a per-tick read error, not the end of the session.
    std::fs::remove_file(&path).unwrap();
    let mut saw_error = false;
    for _ in 0..5 {
        if let Notification::ReadError(_) = next_notification(&mut rx, Duration::from_secs(2)).await {
            saw_error = true;
            break;
        }
    }
    assert!(saw_error);
    assert!(controller.is_watching());

    with_timeout(controller.stop()).await;
    assert!(!controller.is_watching());
}
