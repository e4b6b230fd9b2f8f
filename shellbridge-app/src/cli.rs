use anyhow::{anyhow, bail, Context, Result};
use shellbridge_protocol::Bounds;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: shellbridge [--config <path>] [command]

Commands:
  run                                    wait for the backend and show the greeting (default)
  sources                                list capture sources
  capture <x> <y> <width> <height> [--source <id>]
                                         capture a screen region";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Sources,
    Capture {
        bounds: Bounds,
        source: Option<String>,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub command: Command,
}

impl CliArgs {
    /// Parse arguments without the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut config = None;
        let mut source = None;
        let mut positional = Vec::new();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = iter.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                    config = Some(PathBuf::from(path));
                }
                "--source" => {
                    let id = iter.next().ok_or_else(|| anyhow!("--source needs an id"))?;
                    source = Some(id.clone());
                }
                "--help" | "-h" => {
                    return Ok(Self {
                        config,
                        command: Command::Help,
                    })
                }
                flag if flag.starts_with('-') => bail!("unknown option: {}", flag),
                _ => positional.push(arg.as_str()),
            }
        }

        let command = match positional.as_slice() {
            [] | ["run"] => Command::Run,
            ["sources"] => Command::Sources,
            ["capture", x, y, width, height] => Command::Capture {
                bounds: Bounds::new(
                    number("x", x)?,
                    number("y", y)?,
                    number("width", width)?,
                    number("height", height)?,
                ),
                source: source.take(),
            },
            ["capture", ..] => bail!("capture needs <x> <y> <width> <height>"),
            [other, ..] => bail!("unknown command: {}", other),
        };

        if source.is_some() {
            bail!("--source only applies to capture");
        }

        Ok(Self { config, command })
    }
}

fn number(name: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .with_context(|| format!("{} must be a non-negative integer, got '{}'", name, value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs> {
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        CliArgs::parse(&owned)
    }

    #[test]
    fn test_defaults_to_run() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.command, Command::Run);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_config_before_command() {
        let cli = parse(&["--config", "shell.yaml", "sources"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("shell.yaml")));
        assert_eq!(cli.command, Command::Sources);
    }

    #[test]
    fn test_capture_with_source() {
        let cli = parse(&["capture", "10", "20", "100", "50", "--source", "DP-1"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Capture {
                bounds: Bounds::new(10, 20, 100, 50),
                source: Some("DP-1".into()),
            }
        );
    }

    #[test]
    fn test_bad_input_rejected() {
        assert!(parse(&["capture", "10", "20"]).is_err());
        assert!(parse(&["capture", "-5", "0", "1", "1"]).is_err());
        assert!(parse(&["capture", "a", "0", "1", "1"]).is_err());
        assert!(parse(&["sources", "--source", "DP-1"]).is_err());
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["dance"]).is_err());
    }
}
