//! Shared helpers for cacher's integration tests: a config builder, a
//! scripted pull backend with a recording sleeper, and test logging.

pub mod builders;
pub mod fake_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use cacher::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Upper bound for one test step that talks to the real pull backend.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Filter used by [`init_tracing`]: `CACHER_LOG` when it parses, else `info`.
pub fn test_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Route cacher's logs into the test harness.
///
/// Output is captured per test and shown only for failures (or with
/// `--nocapture`). Raise the level the same way as for the binary, e.g.
/// `CACHER_LOG=cacher=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(test_filter())
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test step timed out after {TEST_TIMEOUT:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_timeout_returns_the_value() {
        assert_eq!(with_timeout(async { 7 }).await, 7);
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::info!("logged from a test");
    }
}
