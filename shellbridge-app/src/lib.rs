//! Wiring for the `shellbridge` binary: configuration, argument parsing and
//! the terminal stand-in for the view's display.

pub mod cli;
pub mod config;
pub mod display;

pub use cli::{CliArgs, Command};
pub use config::ShellConfig;
pub use display::TerminalDisplay;
