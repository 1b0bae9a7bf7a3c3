//! Shared helpers for the `tododag` test suites.

pub mod builders;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// How long [`with_timeout`] lets a watch-loop future run.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Route `tracing` output into the test harness capture.
///
/// Reads `TODODAG_LOG`, like the binary; defaults to `tododag=debug` so a
/// failing test shows the rebuild decisions that led to it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("TODODAG_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn,tododag=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Await `f`, failing the test if it outlives [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(f: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(out) => out,
        Err(_) => panic!("future did not finish within {TEST_TIMEOUT:?}"),
    }
}
