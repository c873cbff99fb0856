use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use cacher::exec::{PullBackend, PullRequest};
use cacher::retry::Sleeper;

/// One recorded call to [`FakePullBackend::pull`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullCall {
    pub uri: String,
    pub attempt: u32,
}

/// A fake pull backend that:
/// - records every attempt in order
/// - fails the first `n` attempts of images registered with `fail_times`
/// - fails every attempt of images registered with `always_fail`
#[derive(Debug, Clone, Default)]
pub struct FakePullBackend {
    calls: Arc<Mutex<Vec<PullCall>>>,
    requests: Arc<Mutex<Vec<PullRequest>>>,
    failures: Arc<Mutex<HashMap<String, u32>>>,
}

impl FakePullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_times(self, uri: &str, times: u32) -> Self {
        self.failures.lock().unwrap().insert(uri.to_string(), times);
        self
    }

    pub fn always_fail(self, uri: &str) -> Self {
        self.fail_times(uri, u32::MAX)
    }

    pub fn calls(&self) -> Vec<PullCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<PullRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Distinct images in the order they were first attempted.
    pub fn pulled_uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = Vec::new();
        for call in self.calls() {
            if !uris.contains(&call.uri) {
                uris.push(call.uri);
            }
        }
        uris
    }
}

impl PullBackend for FakePullBackend {
    fn pull<'a>(
        &'a self,
        request: &'a PullRequest,
        attempt: u32,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let uri = request.image.uri().to_string();
        self.calls.lock().unwrap().push(PullCall {
            uri: uri.clone(),
            attempt,
        });
        self.requests.lock().unwrap().push(request.clone());

        let fail_for = self.failures.lock().unwrap().get(&uri).copied().unwrap_or(0);

        Box::pin(async move {
            if attempt <= fail_for {
                Err(anyhow!("simulated pull failure for '{uri}' (attempt {attempt})"))
            } else {
                Ok(())
            }
        })
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn delay_secs(&self) -> Vec<u64> {
        self.delays().iter().map(Duration::as_secs).collect()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.delays.lock().unwrap().push(delay);
        Box::pin(async {})
    }
}
