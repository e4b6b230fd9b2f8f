//! Command envelope exchanged with the backend service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub type Params = Map<String, Value>;

/// Backend commands the client knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCommand {
    GetHelloMessage,
    Echo,
}

impl BackendCommand {
    pub const ALL: [BackendCommand; 2] = [BackendCommand::GetHelloMessage, BackendCommand::Echo];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendCommand::GetHelloMessage => "get-hello-message",
            BackendCommand::Echo => "echo",
        }
    }
}

impl fmt::Display for BackendCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendCommand::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| format!("unknown command: {s}"))
    }
}

/// One call into the backend. `id` correlates the reply; it is never used
/// for deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub id: String,
    pub command: String,
    #[serde(default)]
    pub params: Params,
}

impl CommandRequest {
    pub fn new(id: impl Into<String>, command: BackendCommand, params: Params) -> Self {
        Self {
            id: id.into(),
            command: command.as_str().to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub id: String,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn success(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            status: ResponseStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ResponseStatus::Error,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Collapse the envelope. A success without `data` is reported as an
    /// error since every command answers with a payload.
    pub fn into_result(self) -> Result<Value, String> {
        match self.status {
            ResponseStatus::Success => self
                .data
                .ok_or_else(|| format!("response {} carried no data", self.id)),
            ResponseStatus::Error => Err(self
                .error
                .unwrap_or_else(|| "backend reported an error without a message".to_string())),
        }
    }
}
