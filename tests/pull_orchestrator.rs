// tests/pull_orchestrator.rs

mod common;
use crate::common::builders::CacheConfigBuilder;
use crate::common::fake_backend::{FakePullBackend, PullCall, RecordingSleeper};
use crate::common::init_tracing;

use std::path::PathBuf;

use cacher::errors::CacherError;
use cacher::pull::pull_all;

fn call(uri: &str, attempt: u32) -> PullCall {
    PullCall {
        uri: uri.to_string(),
        attempt,
    }
}

#[tokio::test]
async fn pulls_each_image_once_in_list_order() {
    init_tracing();
    let config = CacheConfigBuilder::new()
        .image("docker://example/a:1.0")
        .image("docker://example/b:2.0")
        .image("docker://example/c:3.0")
        .build();
    let backend = FakePullBackend::new();
    let sleeper = RecordingSleeper::new();

    let summary = pull_all(&config, &backend, &sleeper).await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            call("docker://example/a:1.0", 1),
            call("docker://example/b:2.0", 1),
            call("docker://example/c:3.0", 1),
        ]
    );
    assert_eq!(summary.reports.len(), 3);
    assert_eq!(summary.total_attempts(), 3);
    assert_eq!(summary.retried().count(), 0);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn requests_carry_cache_and_tmp_dirs() {
    init_tracing();
    let config = CacheConfigBuilder::new()
        .cache_dir("/data/cache")
        .tmp_dir("/tmp/u/cacher/.singularity")
        .image("docker://example/a:1.0")
        .build();
    let backend = FakePullBackend::new();

    pull_all(&config, &backend, &RecordingSleeper::new()).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].cache_dir, PathBuf::from("/data/cache"));
    assert_eq!(requests[0].tmp_dir, PathBuf::from("/tmp/u/cacher/.singularity"));
    assert_eq!(requests[0].image.uri(), "docker://example/a:1.0");
}

#[tokio::test]
async fn transient_failures_are_retried_with_backoff() {
    init_tracing();
    let config = CacheConfigBuilder::new()
        .image("docker://example/a:1.0")
        .image("docker://example/b:2.0")
        .build();
    let backend = FakePullBackend::new().fail_times("docker://example/a:1.0", 3);
    let sleeper = RecordingSleeper::new();

    let summary = pull_all(&config, &backend, &sleeper).await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            call("docker://example/a:1.0", 1),
            call("docker://example/a:1.0", 2),
            call("docker://example/a:1.0", 3),
            call("docker://example/a:1.0", 4),
            call("docker://example/b:2.0", 1),
        ]
    );
    assert_eq!(sleeper.delay_secs(), vec![4, 16, 64]);
    assert_eq!(summary.reports[0].attempts, 4);
    assert_eq!(summary.reports[1].attempts, 1);
    assert_eq!(summary.retried().count(), 1);
}

#[tokio::test]
async fn exhausted_image_aborts_the_whole_run() {
    init_tracing();
    let config = CacheConfigBuilder::new()
        .image("docker://example/a:1.0")
        .image("docker://example/b:2.0")
        .image("docker://example/c:3.0")
        .build();
    let backend = FakePullBackend::new().always_fail("docker://example/b:2.0");
    let sleeper = RecordingSleeper::new();

    let err = pull_all(&config, &backend, &sleeper).await.unwrap_err();

    match err {
        CacherError::ExhaustedRetries { image, attempts } => {
            assert_eq!(image, "docker://example/b:2.0");
            assert_eq!(attempts, 5);
        }
        other => panic!("expected ExhaustedRetries, got {other:?}"),
    }
    assert_eq!(
        backend.pulled_uris(),
        vec!["docker://example/a:1.0", "docker://example/b:2.0"]
    );
    assert_eq!(backend.calls().len(), 1 + 5);
    assert_eq!(sleeper.delay_secs(), vec![4, 16, 64, 256]);
}

#[tokio::test]
async fn custom_policy_bounds_attempts() {
    init_tracing();
    let config = CacheConfigBuilder::new()
        .retry(2, 3)
        .image("docker://example/a:1.0")
        .build();
    let backend = FakePullBackend::new().always_fail("docker://example/a:1.0");
    let sleeper = RecordingSleeper::new();

    let err = pull_all(&config, &backend, &sleeper).await.unwrap_err();

    assert!(matches!(err, CacherError::ExhaustedRetries { attempts: 2, .. }));
    assert_eq!(sleeper.delay_secs(), vec![3]);
}

#[tokio::test]
async fn second_run_with_same_images_succeeds() {
    init_tracing();
    let config = CacheConfigBuilder::new()
        .image("docker://example/a:1.0")
        .image("docker://example/b:2.0")
        .build();
    let backend = FakePullBackend::new();
    let sleeper = RecordingSleeper::new();

    pull_all(&config, &backend, &sleeper).await.unwrap();
    pull_all(&config, &backend, &sleeper).await.unwrap();

    assert_eq!(backend.calls().len(), 4);
}
