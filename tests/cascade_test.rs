// tests/cascade_test.rs — Integration test: cascade resolver with mock providers

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use booomerangs::demo::{default_templates, DemoResponder, GREETINGS};
use booomerangs::infra::errors::{ErrorKind, ProviderError};
use booomerangs::provider::cascade::{CascadeResolver, ResolveOptions, DEMO_MODEL, LOCAL_FALLBACK};
use booomerangs::provider::retry::{RetryConfig, RetryProvider};
use booomerangs::provider::{ChatProvider, ChatRequest};

/// A mock provider that answers after a delay, without any network calls.
struct MockProvider {
    name: &'static str,
    delay: Duration,
    timeout: Duration,
    reply: Result<&'static str, ErrorKind>,
    calls: AtomicU32,
}

impl MockProvider {
    fn answering(name: &'static str, text: &'static str, delay_ms: u64, timeout_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay: Duration::from_millis(delay_ms),
            timeout: Duration::from_millis(timeout_ms),
            reply: Ok(text),
            calls: AtomicU32::new(0),
        })
    }

    fn failing(name: &'static str, kind: ErrorKind) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay: Duration::ZERO,
            timeout: Duration::from_millis(500),
            reply: Err(kind),
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call(&self, _request: &ChatRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match self.reply {
            Ok(text) => Ok(text.to_string()),
            Err(kind) => Err(ProviderError::new(self.name, kind, "mock failure")),
        }
    }
}

fn resolver(providers: Vec<Arc<dyn ChatProvider>>) -> CascadeResolver {
    CascadeResolver::new(providers, DemoResponder::with_seed(default_templates(), 1))
}

#[tokio::test]
async fn test_first_provider_answers_and_later_ones_never_run() {
    let a = MockProvider::answering("A", "ok", 50, 1000);
    let b = MockProvider::answering("B", "unused", 0, 1000);
    let r = resolver(vec![a.clone(), b.clone()]);

    let res = r.resolve(&ChatRequest::new("hi"), &ResolveOptions::default()).await;

    assert_eq!(res.text, "ok");
    assert_eq!(res.provider, "A");
    assert_eq!(res.model, "mock-model");
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 0);
}

#[tokio::test]
async fn test_slow_provider_times_out_and_next_answers() {
    let a = MockProvider::answering("A", "too late", 500, 200);
    let b = MockProvider::answering("B", "fallback-ok", 50, 1000);
    let r = resolver(vec![a.clone(), b.clone()]);

    let started = Instant::now();
    let res = r.resolve(&ChatRequest::new("hi"), &ResolveOptions::default()).await;
    let elapsed = started.elapsed();

    assert_eq!(res.text, "fallback-ok");
    assert_eq!(res.provider, "B");
    assert_eq!(res.attempts.len(), 2);
    assert_eq!(res.attempts[0].error_kind, Some(ErrorKind::Network));
    // A's 500ms answer is abandoned at its 200ms deadline.
    assert!(elapsed < Duration::from_millis(480), "took {elapsed:?}");
}

#[tokio::test]
async fn test_all_failing_gives_local_fallback_within_budget() {
    let a = MockProvider::failing("A", ErrorKind::MissingCredential);
    let b = MockProvider::answering("B", "never", 1000, 100);
    let c = MockProvider::failing("C", ErrorKind::BadResponse);
    let r = resolver(vec![a.clone(), b.clone(), c.clone()]);

    let started = Instant::now();
    let res = r
        .resolve(&ChatRequest::new("привет"), &ResolveOptions::default())
        .await;

    assert_eq!(res.provider, LOCAL_FALLBACK);
    assert_eq!(res.model, DEMO_MODEL);
    assert!(GREETINGS.contains(&res.text.as_str()));
    assert_eq!(res.attempts.len(), 3);
    assert!(res.attempts.iter().all(|a| !a.success));
    assert!(started.elapsed() < Duration::from_millis(500 + 100 + 500 + 200));
    assert_eq!(r.last_success(), None);
}

#[tokio::test]
async fn test_fallback_never_becomes_last_success() {
    let a = MockProvider::failing("A", ErrorKind::Network);
    let r = resolver(vec![a.clone()]);
    r.resolve(&ChatRequest::new("x"), &ResolveOptions::default()).await;
    assert_eq!(r.last_success(), None);
}

#[tokio::test]
async fn test_conversation_preference_beats_last_success() {
    let a = MockProvider::answering("A", "from A", 0, 500);
    let b = MockProvider::answering("B", "from B", 0, 500);
    let r = resolver(vec![a.clone(), b.clone()]);

    r.resolve(&ChatRequest::new("1"), &ResolveOptions::default()).await;
    assert_eq!(r.last_success().as_deref(), Some("A"));

    let opts = ResolveOptions {
        preferred: Some("B".into()),
        ..Default::default()
    };
    let res = r.resolve(&ChatRequest::new("2"), &opts).await;
    assert_eq!(res.provider, "B");
    assert_eq!(a.calls(), 1);
}

#[tokio::test]
async fn test_retry_wrapper_stays_inside_timeout() {
    // Flaky network: every call fails slowly; retries must not outlive the budget.
    struct SlowNetworkFailure;

    #[async_trait]
    impl ChatProvider for SlowNetworkFailure {
        fn name(&self) -> &str {
            "slow-net"
        }
        fn model(&self) -> &str {
            "m"
        }
        fn timeout(&self) -> Duration {
            Duration::from_millis(150)
        }
        async fn call(&self, _r: &ChatRequest) -> Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_millis(60)).await;
            Err(ProviderError::network("slow-net", "reset"))
        }
    }

    let wrapped = RetryProvider::with_config(
        Arc::new(SlowNetworkFailure),
        RetryConfig::new(3, Duration::from_millis(50)),
    );
    let r = resolver(vec![Arc::new(wrapped)]);

    let started = Instant::now();
    let res = r.resolve(&ChatRequest::new("x"), &ResolveOptions::default()).await;
    assert!(res.is_fallback());
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_concurrent_resolutions_are_independent() {
    let a = MockProvider::answering("A", "ok", 30, 500);
    let r = Arc::new(resolver(vec![a.clone()]));

    let mut handles = Vec::new();
    for i in 0..8 {
        let r = r.clone();
        handles.push(tokio::spawn(async move {
            r.resolve(&ChatRequest::new(format!("q{i}")), &ResolveOptions::default())
                .await
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().provider, "A");
    }
    assert_eq!(a.calls(), 8);
}
