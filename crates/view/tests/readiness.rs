#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use serde_json::json;
use shellbridge_protocol::{
    BridgeCall, BridgeClient, BridgeError, BridgeReply, CommandResponse, ReadinessStatus,
};
use shellbridge_view::poller::TIMEOUT_MESSAGE;
use shellbridge_view::{
    load_hello_message, HostApi, MessageDisplay, PollOutcome, PollState, PollerConfig,
    ReadinessPoller, RetryPolicy, StartupOutcome,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// What `isGoReady` reports before the backend comes up.
#[derive(Clone)]
enum Behaviour {
    ReadyOn(u32),
    NeverReady,
    AlwaysError(&'static str),
    ErrorThenStarting(u32),
    BridgeDown,
}

struct FakeHost {
    behaviour: Behaviour,
    polls: AtomicU32,
}

impl FakeHost {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            polls: AtomicU32::new(0),
        })
    }

    fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BridgeClient for FakeHost {
    async fn call(&self, call: BridgeCall) -> Result<BridgeReply, BridgeError> {
        match call {
            BridgeCall::IsGoReady => {
                let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
                let status = match self.behaviour {
                    Behaviour::ReadyOn(target) if n >= target => ReadinessStatus::ready(),
                    Behaviour::ReadyOn(_) | Behaviour::NeverReady => ReadinessStatus::starting(),
                    Behaviour::AlwaysError(e) => ReadinessStatus::failed(e),
                    Behaviour::ErrorThenStarting(errors) if n <= errors => {
                        ReadinessStatus::failed("health check failed")
                    }
                    Behaviour::ErrorThenStarting(_) => ReadinessStatus::starting(),
                    Behaviour::BridgeDown => {
                        return Err(BridgeError::HandlerCancelled("isGoReady".into()))
                    }
                };
                Ok(BridgeReply::Readiness(status))
            }
            BridgeCall::SendRequest(request) => Ok(BridgeReply::Command(
                CommandResponse::success(request.id, json!({"message": "Hello World"})),
            )),
            other => Err(BridgeError::UnknownCapability(other.capability().to_string())),
        }
    }
}

fn config(max_attempts: u32) -> PollerConfig {
    PollerConfig {
        max_attempts,
        retry: RetryPolicy::Fixed { delay_ms: 1 },
        error_budget: None,
    }
}

async fn poll(host: &Arc<FakeHost>, config: PollerConfig) -> PollOutcome {
    let api = HostApi::new(Arc::clone(host) as Arc<dyn BridgeClient>);
    ReadinessPoller::new(api, config).run().await
}

#[tokio::test]
async fn ready_after_exactly_n_attempts() {
    for n in [1, 2, 7, 30] {
        let host = FakeHost::new(Behaviour::ReadyOn(n));
        let outcome = poll(&host, config(30)).await;
        assert_eq!(outcome, PollOutcome::Ready { attempts: n });
        assert_eq!(host.polls(), n);
    }
}

#[tokio::test]
async fn never_ready_times_out_with_generic_message() {
    let host = FakeHost::new(Behaviour::NeverReady);
    let outcome = poll(&host, config(5)).await;
    assert_eq!(outcome, PollOutcome::TimedOut { attempts: 5 });
    assert_eq!(outcome.failure_message().as_deref(), Some(TIMEOUT_MESSAGE));
    assert_eq!(host.polls(), 5);
}

#[tokio::test]
async fn persistent_error_is_reported_verbatim() {
    let host = FakeHost::new(Behaviour::AlwaysError("backend crashed"));
    let outcome = poll(&host, config(4)).await;
    assert_eq!(
        outcome,
        PollOutcome::Failed {
            attempts: 4,
            last_error: "backend crashed".into()
        }
    );
    assert_eq!(outcome.failure_message().as_deref(), Some("backend crashed"));
}

#[tokio::test]
async fn earlier_error_survives_later_starting_replies() {
    let host = FakeHost::new(Behaviour::ErrorThenStarting(1));
    let outcome = poll(&host, config(3)).await;
    assert_eq!(outcome.failure_message().as_deref(), Some("health check failed"));
}

#[tokio::test]
async fn error_budget_stops_early() {
    let host = FakeHost::new(Behaviour::AlwaysError("backend crashed"));
    let outcome = poll(
        &host,
        PollerConfig {
            error_budget: Some(2),
            ..config(30)
        },
    )
    .await;
    assert_eq!(outcome.attempts(), 2);
    assert_eq!(outcome.state(), PollState::Failed);
    assert_eq!(host.polls(), 2);
}

#[tokio::test]
async fn error_budget_resets_when_errors_stop() {
    let host = FakeHost::new(Behaviour::ErrorThenStarting(1));
    let outcome = poll(
        &host,
        PollerConfig {
            error_budget: Some(2),
            ..config(4)
        },
    )
    .await;
    assert_eq!(outcome.attempts(), 4);
    assert_eq!(outcome.failure_message().as_deref(), Some("health check failed"));
}

#[tokio::test]
async fn bridge_failure_is_treated_as_transient() {
    let host = FakeHost::new(Behaviour::BridgeDown);
    let outcome = poll(&host, config(3)).await;
    assert_eq!(outcome.attempts(), 3);
    let message = outcome.failure_message().unwrap();
    assert!(message.contains("isGoReady"), "{message}");
}

#[tokio::test]
async fn progress_ends_in_terminal_state() {
    let host = FakeHost::new(Behaviour::ReadyOn(3));
    let api = HostApi::new(Arc::clone(&host) as Arc<dyn BridgeClient>);
    let poller = ReadinessPoller::new(api, config(10));
    let progress = poller.subscribe();
    assert_eq!(progress.borrow().state, PollState::Polling);

    poller.run().await;
    let last = progress.borrow().clone();
    assert_eq!(last.state, PollState::Ready);
    assert_eq!(last.attempts, 3);
    assert_eq!(last.max_attempts, 10);
}

#[derive(Default)]
struct Recorded(Mutex<Vec<String>>);

#[async_trait]
impl MessageDisplay for Recorded {
    async fn show(&self, text: &str) {
        self.0.lock().unwrap().push(text.to_string());
    }
}

#[tokio::test]
async fn startup_shows_greeting_once_ready() {
    let host = FakeHost::new(Behaviour::ReadyOn(2));
    let display = Arc::new(Recorded::default());
    let outcome = load_hello_message(host, config(5), display.clone()).await;
    assert_eq!(outcome, StartupOutcome::Loaded("Hello World".into()));
    let lines = display.0.lock().unwrap();
    assert_eq!(lines.first().unwrap(), "Loading...");
    assert_eq!(lines.last().unwrap(), "Hello World");
}

#[tokio::test]
async fn startup_shows_every_attempt_count() {
    let host = FakeHost::new(Behaviour::ReadyOn(3));
    let display = Arc::new(Recorded::default());
    load_hello_message(host, config(5), display.clone()).await;
    assert_eq!(
        *display.0.lock().unwrap(),
        vec![
            "Loading...".to_string(),
            "Loading... (1/5)".to_string(),
            "Loading... (2/5)".to_string(),
            "Hello World".to_string(),
        ]
    );
}

#[tokio::test]
async fn poller_events_are_not_coalesced() {
    let host = FakeHost::new(Behaviour::NeverReady);
    let api = HostApi::new(Arc::clone(&host) as Arc<dyn BridgeClient>);
    let mut poller = ReadinessPoller::new(api, config(4));
    let mut events = poller.events();
    poller.run().await;

    let mut seen = Vec::new();
    while let Ok(progress) = events.try_recv() {
        seen.push((progress.state, progress.attempts));
    }
    assert_eq!(
        seen,
        vec![
            (PollState::Polling, 1),
            (PollState::Polling, 2),
            (PollState::Polling, 3),
            (PollState::Polling, 4),
            (PollState::TimedOut, 4),
        ]
    );
}

#[tokio::test]
async fn startup_reports_backend_error() {
    let host = FakeHost::new(Behaviour::AlwaysError("backend crashed"));
    let display = Arc::new(Recorded::default());
    let outcome = load_hello_message(host, config(3), display.clone()).await;
    assert!(matches!(outcome, StartupOutcome::BackendUnavailable(_)));
    assert_eq!(
        display.0.lock().unwrap().last().unwrap(),
        "Backend failed to start: backend crashed"
    );
}

#[tokio::test]
async fn startup_reports_timeout() {
    let host = FakeHost::new(Behaviour::NeverReady);
    let display = Arc::new(Recorded::default());
    load_hello_message(host, config(3), display.clone()).await;
    assert_eq!(display.0.lock().unwrap().last().unwrap(), TIMEOUT_MESSAGE);
}
