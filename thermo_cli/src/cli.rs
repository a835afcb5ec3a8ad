//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "thermo", version, about = "Thermocouple PID controller with a SCPI-style command line")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log (and report errors) as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop; commands are read line by line from the serial port or stdin
    Run {
        /// Override control.period_ms
        #[arg(long, value_name = "MS")]
        period_ms: Option<u64>,
        /// Stop after this many control cycles
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Stop once the command input reaches end of file
        #[arg(long, action = ArgAction::SetTrue)]
        exit_on_eof: bool,
        /// Serial device to use instead of stdin/stdout (overrides serial.port)
        #[arg(long, value_name = "PATH")]
        port: Option<PathBuf>,
        /// Skip the startup conversion/settle sequence
        #[arg(long, action = ArgAction::SetTrue)]
        no_prime: bool,
    },
    /// Validate the configuration and print the effective settings
    CheckConfig,
}
