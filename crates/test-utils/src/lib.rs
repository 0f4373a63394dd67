pub mod builders;

use std::sync::Once;
use std::time::Duration;

use samplewatch::watch::Notification;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Wait for the next notification, failing the test if none arrives within
/// `limit` or the channel closes.
pub async fn next_notification(
    rx: &mut mpsc::Receiver<Notification>,
    limit: Duration,
) -> Notification {
    tokio::time::timeout(limit, rx.recv())
        .await
        .unwrap_or_else(|_| panic!("no notification within {limit:?}"))
        .expect("notification channel closed")
}

/// Collect everything that arrives within `window`.
pub async fn drain_for(rx: &mut mpsc::Receiver<Notification>, window: Duration) -> Vec<Notification> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(n)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        seen.push(n);
    }
    seen
}
