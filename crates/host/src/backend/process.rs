//! Backend running as a child process speaking JSON lines over stdio.

use super::{Backend, NOT_READY_ERROR};
use crate::error::HostError;
use async_trait::async_trait;
use parking_lot::Mutex;
use shellbridge_protocol::{BackendCommand, CommandRequest, CommandResponse, Params, ReadinessStatus};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Weak};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex as AsyncMutex, RwLock};
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const EXIT_STATUS_WAIT: Duration = Duration::from_millis(200);
const READINESS_RETRY_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
enum BackendState {
    Starting,
    /// The process is alive but its last readiness check failed. Checks continue.
    Unhealthy(String),
    Ready,
    /// Spawn failure or process exit. Terminal.
    Failed(String),
    Stopped,
}

impl BackendState {
    fn is_checking(&self) -> bool {
        matches!(self, BackendState::Starting | BackendState::Unhealthy(_))
    }
}

/// Requests waiting for their response line. Once `closed` is set no new
/// waiter is accepted.
#[derive(Default)]
struct PendingTable {
    waiters: HashMap<String, oneshot::Sender<CommandResponse>>,
    closed: Option<String>,
}

type Pending = Arc<Mutex<PendingTable>>;

pub struct ProcessBackend {
    state: Arc<RwLock<BackendState>>,
    stdin: AsyncMutex<Option<ChildStdin>>,
    pending: Pending,
    child: Arc<AsyncMutex<Option<Child>>>,
}

impl ProcessBackend {
    /// Spawn the backend and start probing it. A spawn failure does not
    /// error here; it shows up as the readiness error.
    pub fn start(program: impl Into<PathBuf>, args: Vec<String>) -> Arc<Self> {
        let program = program.into();
        match spawn_child(&program, &args) {
            Ok(mut child) => {
                info!("Spawned backend {} (pid {:?})", program.display(), child.id());
                let stdin = child.stdin.take();
                let stdout = child.stdout.take();
                let backend = Arc::new(Self {
                    state: Arc::new(RwLock::new(BackendState::Starting)),
                    stdin: AsyncMutex::new(stdin),
                    pending: Arc::new(Mutex::new(PendingTable::default())),
                    child: Arc::new(AsyncMutex::new(Some(child))),
                });
                match stdout {
                    Some(stdout) => backend.spawn_reader(stdout),
                    None => close_pending(&backend.pending, "backend stdout unavailable"),
                }
                backend.spawn_readiness_check();
                backend
            }
            Err(e) => {
                error!("{}", e);
                let reason = e.to_string();
                let pending = PendingTable {
                    closed: Some(reason.clone()),
                    ..PendingTable::default()
                };
                Arc::new(Self {
                    state: Arc::new(RwLock::new(BackendState::Failed(reason))),
                    stdin: AsyncMutex::new(None),
                    pending: Arc::new(Mutex::new(pending)),
                    child: Arc::new(AsyncMutex::new(None)),
                })
            }
        }
    }

    fn spawn_reader(&self, stdout: ChildStdout) {
        let state = Arc::clone(&self.state);
        let pending = Arc::clone(&self.pending);
        let child = Arc::clone(&self.child);

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => route_response(&pending, &line),
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read backend output: {}", e);
                        break;
                    }
                }
            }

            let reason = exit_reason(&child).await;
            {
                let mut state = state.write().await;
                if *state != BackendState::Stopped {
                    error!("Backend terminated: {}", reason);
                    *state = BackendState::Failed(reason.clone());
                }
            }
            close_pending(&pending, &reason);
        });
    }

    /// Send `get-hello-message` until one succeeds. Stops once the
    /// process has exited, has been shut down or the backend is dropped.
    fn spawn_readiness_check(self: &Arc<Self>) {
        let backend: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut attempt: u64 = 0;
            loop {
                let Some(this) = backend.upgrade() else {
                    return;
                };
                attempt += 1;
                let request = CommandRequest::new(
                    format!(
                        "readiness-check-{}-{}",
                        chrono::Utc::now().timestamp_millis(),
                        attempt
                    ),
                    BackendCommand::GetHelloMessage,
                    Params::new(),
                );
                let response = this.dispatch(request).await;

                {
                    let mut state = this.state.write().await;
                    if !state.is_checking() {
                        return;
                    }
                    match response.into_result() {
                        Ok(_) => {
                            info!("Backend is ready after {} check(s)", attempt);
                            *state = BackendState::Ready;
                            return;
                        }
                        Err(e) => {
                            warn!("Backend readiness check {} failed: {}", attempt, e);
                            *state = BackendState::Unhealthy(e);
                        }
                    }
                }

                drop(this);
                tokio::time::sleep(READINESS_RETRY_INTERVAL).await;
            }
        });
    }

    /// Requests still waiting for a response line.
    pub fn pending_requests(&self) -> usize {
        self.pending.lock().waiters.len()
    }

    async fn dispatch(&self, request: CommandRequest) -> CommandResponse {
        let id = request.id.clone();
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = self.pending.lock();
            if let Some(reason) = &pending.closed {
                return CommandResponse::error(&id, reason.clone());
            }
            if pending.waiters.contains_key(&id) {
                return CommandResponse::error(&id, format!("request id already in flight: {id}"));
            }
            pending.waiters.insert(id.clone(), tx);
        }
        let mut waiter = Waiter {
            pending: &self.pending,
            id: id.clone(),
            rx: Some(rx),
        };

        if let Err(e) = self.write_request(&request).await {
            return CommandResponse::error(&id, e.to_string());
        }

        let answer = match waiter.rx.as_mut() {
            Some(rx) => rx.await.ok(),
            None => None,
        };
        answer.unwrap_or_else(|| CommandResponse::error(&id, "backend exited before answering"))
    }

    async fn write_request(&self, request: &CommandRequest) -> Result<(), HostError> {
        let mut line =
            serde_json::to_string(request).map_err(|e| HostError::BackendIo(e.to_string()))?;
        line.push('\n');

        let mut stdin = self.stdin.lock().await;
        let writer = stdin
            .as_mut()
            .ok_or_else(|| HostError::BackendIo("backend stdin is closed".to_string()))?;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| HostError::BackendIo(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| HostError::BackendIo(e.to_string()))
    }
}

#[async_trait]
impl Backend for ProcessBackend {
    async fn readiness(&self) -> ReadinessStatus {
        match &*self.state.read().await {
            BackendState::Starting => ReadinessStatus::starting(),
            BackendState::Ready => ReadinessStatus::ready(),
            BackendState::Unhealthy(reason) | BackendState::Failed(reason) => {
                ReadinessStatus::failed(reason.clone())
            }
            BackendState::Stopped => ReadinessStatus::failed("backend stopped"),
        }
    }

    async fn send(&self, request: CommandRequest) -> CommandResponse {
        if *self.state.read().await != BackendState::Ready {
            return CommandResponse::error(&request.id, NOT_READY_ERROR);
        }
        self.dispatch(request).await
    }

    async fn shutdown(&self) {
        {
            let mut state = self.state.write().await;
            if *state == BackendState::Stopped {
                return;
            }
            *state = BackendState::Stopped;
        }

        if let Some(mut stdin) = self.stdin.lock().await.take() {
            let _ = stdin.write_all(b"quit\n").await;
            let _ = stdin.flush().await;
        }

        let mut child = self.child.lock().await;
        if let Some(process) = child.as_mut() {
            match timeout(SHUTDOWN_GRACE, process.wait()).await {
                Ok(Ok(status)) => info!("Backend exited with {}", status),
                Ok(Err(e)) => warn!("Failed to wait for backend: {}", e),
                Err(_) => {
                    warn!("Backend did not exit within {:?}, killing", SHUTDOWN_GRACE);
                    let _ = process.kill().await;
                }
            }
        }
        child.take();
    }
}

/// Owns the receiving half of one pending request. Dropping it, whether the
/// call finished or its future was abandoned, removes the table entry unless
/// the response already claimed it.
struct Waiter<'a> {
    pending: &'a Pending,
    id: String,
    rx: Option<oneshot::Receiver<CommandResponse>>,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        self.rx.take();
        let mut table = self.pending.lock();
        if table
            .waiters
            .get(&self.id)
            .is_some_and(|tx| tx.is_closed())
        {
            table.waiters.remove(&self.id);
        }
    }
}

fn spawn_child(program: &Path, args: &[String]) -> Result<Child, HostError> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| HostError::BackendSpawn(format!("{}: {}", program.display(), e)))
}

fn route_response(pending: &Pending, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    let response: CommandResponse = match serde_json::from_str(line) {
        Ok(response) => response,
        Err(e) => {
            warn!("Ignoring malformed backend output: {}", e);
            return;
        }
    };

    let waiter = pending.lock().waiters.remove(&response.id);
    match waiter {
        Some(tx) => {
            let _ = tx.send(response);
        }
        None => warn!("No pending request for response {}", response.id),
    }
}

fn close_pending(pending: &Pending, reason: &str) {
    let waiters = {
        let mut table = pending.lock();
        table.closed = Some(reason.to_string());
        std::mem::take(&mut table.waiters)
    };
    for (id, tx) in waiters {
        let _ = tx.send(CommandResponse::error(
            &id,
            format!("backend exited before answering: {reason}"),
        ));
    }
}

async fn exit_reason(child: &AsyncMutex<Option<Child>>) -> String {
    let mut child = child.lock().await;
    match child.as_mut() {
        Some(process) => match timeout(EXIT_STATUS_WAIT, process.wait()).await {
            Ok(Ok(status)) => format!("backend exited with {status}"),
            _ => "backend closed its output".to_string(),
        },
        None => "backend stopped".to_string(),
    }
}
