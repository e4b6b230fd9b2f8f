#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use serde_json::Value;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Feed `input` to the compiled backend and collect its stdout lines.
async fn run_backend(input: impl AsRef<[u8]>) -> (Vec<Value>, std::process::ExitStatus) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_shellbridge-backend"))
        .env("SHELLBRIDGE_LOG", "error")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(input.as_ref()).await.unwrap();
    drop(stdin);

    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();
    let mut responses = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        responses.push(serde_json::from_str(&line).unwrap());
    }
    (responses, child.wait().await.unwrap())
}

#[tokio::test]
async fn answers_each_line_in_order() {
    let input = concat!(
        r#"{"id":"a","command":"get-hello-message","params":{}}"#,
        "\n",
        r#"{"id":"b","command":"echo","params":{"text":"ping"}}"#,
        "\n",
        r#"{"id":"c","command":"reboot"}"#,
        "\n",
    );
    let (responses, status) = run_backend(input).await;
    assert!(status.success());
    assert_eq!(responses.len(), 3);

    assert_eq!(responses[0]["id"], "a");
    assert_eq!(responses[0]["status"], "success");
    assert_eq!(responses[0]["data"]["message"], "Hello World");
    assert!(responses[0].get("error").is_none());

    assert_eq!(responses[1]["data"]["echo"], "ping");

    assert_eq!(responses[2]["id"], "c");
    assert_eq!(responses[2]["status"], "error");
    assert_eq!(responses[2]["error"], "unknown command: reboot");
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let input = concat!(
        "this is not json\n",
        "\n",
        r#"{"id":"ok","command":"get-hello-message"}"#,
        "\n",
    );
    let (responses, status) = run_backend(input).await;
    assert!(status.success());
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "ok");
}

#[tokio::test]
async fn quit_stops_before_later_lines() {
    let input = concat!(
        r#"{"id":"1","command":"get-hello-message"}"#,
        "\n",
        "quit\n",
        r#"{"id":"2","command":"get-hello-message"}"#,
        "\n",
    );
    let (responses, status) = run_backend(input).await;
    assert!(status.success());
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "1");
}

#[tokio::test]
async fn non_utf8_line_does_not_stop_the_backend() {
    let mut input = vec![0xFF, 0xFE, b'\n'];
    input.extend_from_slice(b"{\"id\":\"after\",\"command\":\"get-hello-message\"}\n");
    let (responses, status) = run_backend(input).await;
    assert!(status.success());
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "after");
    assert_eq!(responses[0]["data"]["message"], "Hello World");
}
