//! Command-line interface for writerlens.
//!
//! Provides the `serve` command that runs the HTTP service and the
//! one-shot `analyze` command for batch use.

mod commands;

pub use commands::{parse_cli, run_with_cli, AnalyzeArgs, Cli, Commands, ServeArgs};
