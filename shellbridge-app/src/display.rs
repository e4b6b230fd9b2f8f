use async_trait::async_trait;
use shellbridge_view::MessageDisplay;
use std::io::Write;

/// Prints each status update on its own stdout line.
pub struct TerminalDisplay;

#[async_trait]
impl MessageDisplay for TerminalDisplay {
    async fn show(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        if writeln!(stdout, "{}", text).and_then(|_| stdout.flush()).is_err() {
            tracing::warn!("Could not write to stdout");
        }
    }
}
