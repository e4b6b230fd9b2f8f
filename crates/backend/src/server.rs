use crate::error::BackendError;
use crate::handlers::process_command;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const QUIT_COMMAND: &str = "quit";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeStats {
    pub answered: usize,
    pub rejected: usize,
}

/// Answer requests line by line until `quit` or end of input.
///
/// Lines that are not UTF-8 or do not decode as a request are logged and
/// skipped; they get no response line.
pub async fn serve<R, W>(mut reader: R, mut writer: W) -> Result<ServeStats, BackendError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut stats = ServeStats::default();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let input = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!("Skipping line that is not UTF-8: {}", e);
                stats.rejected += 1;
                continue;
            }
        };
        if input.is_empty() {
            continue;
        }
        if input == QUIT_COMMAND {
            tracing::info!("Received quit, stopping");
            break;
        }

        match process_command(input) {
            Ok(response) => {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                stats.answered += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to process command: {}", e);
                stats.rejected += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use shellbridge_protocol::CommandResponse;
    use tokio::io::BufReader;

    async fn run(input: impl AsRef<[u8]>) -> (ServeStats, Vec<CommandResponse>) {
        let mut output = Vec::new();
        let stats = serve(BufReader::new(input.as_ref()), &mut output)
            .await
            .unwrap();
        let responses = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (stats, responses)
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let input = concat!(
            r#"{"id": "a", "command": "get-hello-message", "params": {}}"#,
            "\n",
            r#"{"id": "b", "command": "echo", "params": {"text": "hi"}}"#,
            "\n"
        );
        let (stats, responses) = run(input).await;
        assert_eq!(stats.answered, 2);
        assert_eq!(responses[0].id, "a");
        assert_eq!(responses[1].id, "b");
        assert_eq!(responses[1].data.as_ref().unwrap()["echo"], "hi");
    }

    #[tokio::test]
    async fn test_invalid_lines_are_skipped() {
        let input = concat!(
            "not json\n",
            "\n",
            r#"{"id": "c", "command": "get-hello-message"}"#,
            "\n"
        );
        let (stats, responses) = run(input).await;
        assert_eq!(stats, ServeStats { answered: 1, rejected: 1 });
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, "c");
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_skipped() {
        let mut input = vec![0xFF, 0xFE, b'\n'];
        input.extend_from_slice(br#"{"id": "d", "command": "get-hello-message"}"#);
        input.push(b'\n');
        let (stats, responses) = run(input).await;
        assert_eq!(stats, ServeStats { answered: 1, rejected: 1 });
        assert_eq!(responses[0].id, "d");
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_answered() {
        let (stats, responses) = run(r#"{"id": "e", "command": "get-hello-message"}"#).await;
        assert_eq!(stats.answered, 1);
        assert_eq!(responses[0].id, "e");
    }

    #[tokio::test]
    async fn test_quit_stops_the_loop() {
        let input = concat!(
            "  quit  \n",
            r#"{"id": "never", "command": "get-hello-message"}"#,
            "\n"
        );
        let (stats, responses) = run(input).await;
        assert_eq!(stats.answered, 0);
        assert!(responses.is_empty());
    }
}
