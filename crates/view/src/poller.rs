//! Readiness polling: ask the host whether the backend is up until it is,
//! or until the attempt budget runs out.

use crate::api::HostApi;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shellbridge_protocol::ReadinessStatus;
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const TIMEOUT_MESSAGE: &str = "backend startup timed out, please retry later";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryPolicy {
    Fixed {
        delay_ms: u64,
    },
    /// `base_ms * 2^attempt`, capped at `max_ms`. With jitter the delay is
    /// drawn uniformly from the upper half of that value.
    Exponential {
        base_ms: u64,
        max_ms: u64,
        #[serde(default)]
        jitter: bool,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Fixed {
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given zero-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            RetryPolicy::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            RetryPolicy::Exponential {
                base_ms,
                max_ms,
                jitter,
            } => {
                let factor = 2_u64.saturating_pow(attempt);
                let delay = base_ms.saturating_mul(factor).min(max_ms);
                if jitter && delay > 1 {
                    Duration::from_millis(rand::thread_rng().gen_range(delay / 2..=delay))
                } else {
                    Duration::from_millis(delay)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub max_attempts: u32,
    pub retry: RetryPolicy,
    /// Consecutive reported errors that end polling early. Unset keeps
    /// polling through errors until the attempt budget is spent.
    pub error_budget: Option<u32>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry: RetryPolicy::default(),
            error_budget: None,
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.error_budget == Some(0) {
            return Err("error_budget must be at least 1 when set".to_string());
        }
        if let RetryPolicy::Exponential { base_ms, max_ms, .. } = self.retry {
            if base_ms > max_ms {
                return Err("retry base_ms cannot exceed max_ms".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Ready,
    Failed,
    TimedOut,
}

/// Observable poller state, published after every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollProgress {
    pub state: PollState,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    Failed { attempts: u32, last_error: String },
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }

    /// Number of readiness calls made.
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts }
            | PollOutcome::Failed { attempts, .. }
            | PollOutcome::TimedOut { attempts } => *attempts,
        }
    }

    pub fn state(&self) -> PollState {
        match self {
            PollOutcome::Ready { .. } => PollState::Ready,
            PollOutcome::Failed { .. } => PollState::Failed,
            PollOutcome::TimedOut { .. } => PollState::TimedOut,
        }
    }

    /// The last backend error verbatim, or the generic timeout message.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            PollOutcome::Ready { .. } => None,
            PollOutcome::Failed { last_error, .. } => Some(last_error.clone()),
            PollOutcome::TimedOut { .. } => Some(TIMEOUT_MESSAGE.to_string()),
        }
    }
}

/// Sequential poller: at most one readiness call in flight, always ends in
/// a terminal state.
pub struct ReadinessPoller {
    api: HostApi,
    config: PollerConfig,
    progress: watch::Sender<PollProgress>,
    listeners: Vec<mpsc::UnboundedSender<PollProgress>>,
}

impl ReadinessPoller {
    pub fn new(api: HostApi, config: PollerConfig) -> Self {
        let (progress, _) = watch::channel(PollProgress {
            state: PollState::Polling,
            attempts: 0,
            max_attempts: config.max_attempts,
            last_error: None,
        });
        Self {
            api,
            config,
            progress,
            listeners: Vec::new(),
        }
    }

    /// Latest progress only; intermediate updates may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<PollProgress> {
        self.progress.subscribe()
    }

    /// Every progress update in order, ending with the terminal one.
    pub fn events(&mut self) -> mpsc::UnboundedReceiver<PollProgress> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    pub async fn run(&self) -> PollOutcome {
        let max_attempts = self.config.max_attempts;
        let mut attempts = 0;
        let mut consecutive_errors = 0;
        let mut last_error: Option<String> = None;

        while attempts < max_attempts {
            let status = match self.api.is_go_ready().await {
                Ok(status) => status,
                Err(e) => ReadinessStatus::failed(e.to_string()),
            };

            if status.ready {
                let outcome = PollOutcome::Ready {
                    attempts: attempts + 1,
                };
                info!("Backend ready after {} attempt(s)", attempts + 1);
                self.publish(&outcome, last_error.clone());
                return outcome;
            }

            match status.error {
                Some(error) => {
                    debug!("Readiness attempt {} reported: {}", attempts + 1, error);
                    consecutive_errors += 1;
                    last_error = Some(error);
                }
                None => {
                    debug!("Readiness attempt {}: still starting", attempts + 1);
                    consecutive_errors = 0;
                }
            }

            if let (Some(budget), Some(error)) = (self.config.error_budget, &last_error) {
                if consecutive_errors >= budget {
                    warn!("Giving up after {} consecutive backend errors", consecutive_errors);
                    let outcome = PollOutcome::Failed {
                        attempts: attempts + 1,
                        last_error: error.clone(),
                    };
                    self.publish(&outcome, last_error.clone());
                    return outcome;
                }
            }

            tokio::time::sleep(self.config.retry.delay_for(attempts)).await;
            attempts += 1;
            self.emit(PollProgress {
                state: PollState::Polling,
                attempts,
                max_attempts,
                last_error: last_error.clone(),
            });
        }

        let outcome = match last_error.clone() {
            Some(last_error) => PollOutcome::Failed {
                attempts,
                last_error,
            },
            None => PollOutcome::TimedOut { attempts },
        };
        warn!("Backend not ready after {} attempts: {:?}", attempts, outcome);
        self.publish(&outcome, last_error);
        outcome
    }

    fn publish(&self, outcome: &PollOutcome, last_error: Option<String>) {
        self.emit(PollProgress {
            state: outcome.state(),
            attempts: outcome.attempts(),
            max_attempts: self.config.max_attempts,
            last_error,
        });
    }

    fn emit(&self, progress: PollProgress) {
        for listener in &self.listeners {
            let _ = listener.send(progress.clone());
        }
        self.progress.send_replace(progress);
    }
}
