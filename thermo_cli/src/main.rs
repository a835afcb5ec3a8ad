mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::run::{RunOptions, run_controller};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = match &cli.config {
        Some(path) => thermo_config::load_file(path)?,
        None => thermo_config::Config::default(),
    };
    cfg.validate()?;

    init_logging(&cli.log_level, cli.json, &cfg.logging)?;

    match cli.cmd {
        Commands::Run {
            period_ms,
            cycles,
            exit_on_eof,
            port,
            no_prime,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;

            let opts = RunOptions {
                period_ms,
                cycles,
                exit_on_eof,
                port,
                no_prime,
            };
            let summary = run_controller(&cfg, &opts, &shutdown)?;
            if summary.overruns > 0 {
                tracing::warn!(
                    overruns = summary.overruns,
                    cycles = summary.cycles,
                    "some control cycles overran their period"
                );
            }
            Ok(())
        }
        Commands::CheckConfig => {
            print_config(&cfg, cli.json);
            Ok(())
        }
    }
}

fn print_config(cfg: &thermo_config::Config, json: bool) {
    if json {
        let v = serde_json::json!({
            "period_ms": cfg.control.period_ms,
            "setpoint_min": cfg.control.setpoint_min,
            "setpoint_max": cfg.control.setpoint_max,
            "output": [cfg.control.output_min, cfg.control.output_max],
            "coefficients": [cfg.control.kp, cfg.control.ki, cfg.control.kd],
            "alpha": cfg.filter.alpha,
            "tuning": format!("{:?}", cfg.tuning.source).to_ascii_lowercase(),
            "max_line_len": cfg.serial.max_line_len,
            "error_queue_len": cfg.serial.error_queue_len,
        });
        println!("{v}");
        return;
    }
    println!("config ok");
    println!("  period_ms       {}", cfg.control.period_ms);
    println!(
        "  setpoint        {} .. {} C",
        cfg.control.setpoint_min, cfg.control.setpoint_max
    );
    println!(
        "  output          {} .. {}",
        cfg.control.output_min, cfg.control.output_max
    );
    println!(
        "  coefficients    {},{},{} ({:?} tuning)",
        cfg.control.kp, cfg.control.ki, cfg.control.kd, cfg.tuning.source
    );
    println!("  alpha           {}", cfg.filter.alpha);
    println!("  max_line_len    {}", cfg.serial.max_line_len);
    println!("  error_queue_len {}", cfg.serial.error_queue_len);
}

/// Console logs go to stderr; stdout carries protocol responses.
fn init_logging(level: &str, json: bool, logging: &thermo_config::Logging) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;
    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file:?}"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let file_level = logging.level.as_deref().unwrap_or("info");
            let file_filter = EnvFilter::try_new(file_level)
                .wrap_err_with(|| format!("invalid logging.level {file_level:?}"))?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("init logging: {e}"))
}
