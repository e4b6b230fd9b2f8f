use crate::error::BackendError;
use serde_json::json;
use shellbridge_protocol::{BackendCommand, CommandRequest, CommandResponse};

pub const HELLO_MESSAGE: &str = "Hello World";

/// Answer one request. Always produces a response carrying the request id.
pub fn handle_request(request: &CommandRequest) -> CommandResponse {
    let command = match request.command.parse::<BackendCommand>() {
        Ok(command) => command,
        Err(reason) => {
            tracing::warn!("Rejecting request {}: {}", request.id, reason);
            return CommandResponse::error(&request.id, reason);
        }
    };

    match command {
        BackendCommand::GetHelloMessage => {
            CommandResponse::success(&request.id, json!({"message": HELLO_MESSAGE}))
        }
        BackendCommand::Echo => match request.params.get("text").and_then(|v| v.as_str()) {
            Some(text) => CommandResponse::success(&request.id, json!({"echo": text})),
            None => CommandResponse::error(
                &request.id,
                "parameter 'text' missing or not a string",
            ),
        },
    }
}

/// Decode one input line, handle it and encode the response line.
pub fn process_command(input: &str) -> Result<String, BackendError> {
    let request: CommandRequest = serde_json::from_str(input)
        .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
    let response = handle_request(&request);
    Ok(serde_json::to_string(&response)?)
}
