use shellbridge_backend::serve;
use tokio::io::BufReader;
use tracing::Level;

#[tokio::main]
async fn main() {
    // stdout carries responses, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level())
        .with_target(false)
        .init();

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    match serve(stdin, stdout).await {
        Ok(stats) => {
            tracing::info!(
                "Backend stopped ({} answered, {} rejected)",
                stats.answered,
                stats.rejected
            );
        }
        Err(e) => {
            tracing::error!("Error reading input: {}", e);
            std::process::exit(1);
        }
    }
}

fn log_level() -> Level {
    std::env::var("SHELLBRIDGE_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(Level::INFO)
}
