// tests/retry_properties.rs

mod common;
use crate::common::fake_backend::RecordingSleeper;

use std::sync::atomic::{AtomicU32, Ordering};

use cacher::retry::{retry_with_backoff, RetryPolicy, Retried};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(f)
}

proptest! {
    /// A command failing `k < max` times then succeeding takes `k + 1`
    /// attempts and sleeps `base^1 .. base^k` seconds.
    #[test]
    fn k_failures_then_success(max_attempts in 1u32..=8, base in 1u64..=6, k_seed in 0u32..8) {
        let k = k_seed % max_attempts;
        let policy = RetryPolicy::new(max_attempts, base);
        let sleeper = RecordingSleeper::new();
        let calls = AtomicU32::new(0);

        let result = block_on(retry_with_backoff(&policy, &sleeper, "prop", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { if attempt <= k { Err("transient") } else { Ok(attempt) } }
        }));

        let retried = result.unwrap();
        prop_assert_eq!(retried.attempts, k + 1);
        prop_assert_eq!(calls.load(Ordering::SeqCst), k + 1);
        let expected: Vec<u64> = (1..=k).map(|n| base.pow(n)).collect();
        prop_assert_eq!(sleeper.delay_secs(), expected);
    }

    /// A command that never succeeds runs exactly `max_attempts` times.
    #[test]
    fn always_failing_runs_exactly_max_attempts(max_attempts in 1u32..=8) {
        let policy = RetryPolicy::new(max_attempts, 4);
        let sleeper = RecordingSleeper::new();

        let result: Result<Retried<()>, _> = block_on(retry_with_backoff(
            &policy,
            &sleeper,
            "prop",
            |_| async { Err("permanent") },
        ));

        let exhausted = result.unwrap_err();
        prop_assert_eq!(exhausted.attempts, max_attempts);
        prop_assert_eq!(sleeper.delays().len() as u32, max_attempts - 1);
    }
}
