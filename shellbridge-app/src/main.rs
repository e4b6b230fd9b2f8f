use anyhow::{anyhow, bail, Context, Result};
use shellbridge_app::cli::USAGE;
use shellbridge_app::{CliArgs, Command, ShellConfig, TerminalDisplay};
use shellbridge_host::ShellContext;
use shellbridge_protocol::{Bounds, BridgeClient, RegionCaptureRequest};
use shellbridge_view::{load_hello_message, plan_crop, HostApi, StartupOutcome};
use std::sync::Arc;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args).context("Invalid arguments (try --help)")?;
    if cli.command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = ShellConfig::load(cli.config.as_deref())?;
    let mut shell = ShellContext::new(config.host.clone());
    let bridge: Arc<dyn BridgeClient> = shell.on_ready().context("Failed to start shell")?;

    let result = match cli.command {
        Command::Run => run(bridge, &config).await,
        Command::Sources => sources(HostApi::new(bridge)).await,
        Command::Capture { bounds, source } => capture(HostApi::new(bridge), bounds, source).await,
        Command::Help => Ok(()),
    };

    let action = shell.on_all_windows_closed().await;
    tracing::debug!("Shell closed: {:?}", action);
    result
}

async fn run(bridge: Arc<dyn BridgeClient>, config: &ShellConfig) -> Result<()> {
    match load_hello_message(bridge, config.poller.clone(), Arc::new(TerminalDisplay)).await {
        StartupOutcome::Loaded(_) => Ok(()),
        StartupOutcome::BackendUnavailable(outcome) => {
            bail!("backend unavailable after {} attempt(s)", outcome.attempts())
        }
        StartupOutcome::CommandFailed(reason) => bail!("get-hello-message failed: {}", reason),
    }
}

async fn sources(api: HostApi) -> Result<()> {
    let result = api.get_screenshots().await?;
    if !result.success {
        bail!(
            "listing sources failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    for source in result.screenshots {
        println!("{}\t{}", source.id, source.name);
    }
    Ok(())
}

async fn capture(api: HostApi, bounds: Bounds, source: Option<String>) -> Result<()> {
    let request = match source {
        Some(id) => RegionCaptureRequest::from_source(bounds, id),
        None => RegionCaptureRequest::new(bounds),
    };
    let capture = api
        .take_region_screenshot(request)
        .await?
        .into_result()
        .map_err(|e| anyhow!("capture failed: {}", e))?;
    let crop = plan_crop(&capture)?;

    println!(
        "frame: {}x{}",
        capture.screen_size.width, capture.screen_size.height
    );
    println!(
        "crop: {},{} {}x{}",
        crop.x, crop.y, crop.width, crop.height
    );
    println!("timestamp: {}", capture.timestamp.to_rfc3339());
    Ok(())
}

fn log_level() -> Level {
    std::env::var("SHELLBRIDGE_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(Level::INFO)
}
