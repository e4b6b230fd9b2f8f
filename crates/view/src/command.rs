use crate::api::HostApi;
use crate::error::ViewError;
use serde_json::Value;
use shellbridge_protocol::{BackendCommand, CommandRequest, CommandResponse, Params};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `<command>-<unix millis>-<sequence>`. The sequence keeps ids unique for
/// calls issued within the same millisecond.
pub fn next_request_id(command: BackendCommand) -> String {
    format!(
        "{}-{}-{}",
        command,
        chrono::Utc::now().timestamp_millis(),
        REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

/// Builds command envelopes and sends them through the bridge. Only use
/// after the readiness poller reported ready.
#[derive(Clone)]
pub struct CommandClient {
    api: HostApi,
}

impl CommandClient {
    pub fn new(api: HostApi) -> Self {
        Self { api }
    }

    pub async fn invoke(
        &self,
        command: BackendCommand,
        params: Params,
    ) -> Result<CommandResponse, ViewError> {
        let request = CommandRequest::new(next_request_id(command), command, params);
        tracing::debug!("Sending {} as {}", command, request.id);
        Ok(self.api.send_request(request).await?)
    }

    pub async fn hello_message(&self) -> Result<String, ViewError> {
        let data = self
            .invoke(BackendCommand::GetHelloMessage, Params::new())
            .await?
            .into_result()
            .map_err(ViewError::Command)?;
        string_field(&data, "message")
    }

    pub async fn echo(&self, text: &str) -> Result<String, ViewError> {
        let mut params = Params::new();
        params.insert("text".to_string(), Value::String(text.to_string()));
        let data = self
            .invoke(BackendCommand::Echo, params)
            .await?
            .into_result()
            .map_err(ViewError::Command)?;
        string_field(&data, "echo")
    }
}

fn string_field(data: &Value, field: &str) -> Result<String, ViewError> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ViewError::Command(format!("response is missing '{field}'")))
}
