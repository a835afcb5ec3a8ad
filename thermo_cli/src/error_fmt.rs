//! Human-readable error descriptions and structured JSON error formatting.

use thermo_core::error::{BuildError, ControllerError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTuningInput => {
                "What happened: Analog tuning is selected but no tuning input is available.\nLikely causes: tuning.source = \"analog\" on a build without tuning dials.\nHow to fix: Set tuning.source = \"fixed\" and choose coefficients with control.kp/ki/kd.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid controller configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Run `thermo check-config` to see the effective settings, fix the value, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<ControllerError>() {
        if matches!(ce, ControllerError::Timeout) {
            return "What happened: The thermocouple converter timed out.\nLikely causes: MAX6675 not wired to SPI0/CE0, or no power.\nHow to fix: Check the SPI wiring and 3.3V supply.".to_string();
        }
        return format!(
            "What happened: {ce}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Check the path and rerun. Original: {msg}"
        );
    }

    if lower.contains("invalid configuration") || lower.contains(" must be ") {
        return format!(
            "What happened: Configuration is invalid.\nLikely causes: A TOML syntax error, an unknown value, or an out-of-range setting.\nHow to fix: Edit the TOML config and try again. Details: {msg}"
        );
    }

    if lower.contains("serial port") {
        return format!(
            "What happened: The serial port could not be opened.\nLikely causes: Wrong device path, device in use, or missing dialout permissions.\nHow to fix: Check --port / serial.port. Original: {msg}"
        );
    }

    if lower.contains("spi") || lower.contains("pwm") {
        return "What happened: Failed to initialize hardware.\nLikely causes: SPI or PWM not enabled, or insufficient permissions.\nHow to fix: Enable the interfaces (e.g. raspi-config) and ensure the process can access /dev/spidev* and PWM sysfs.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for configuration problems, 3 for controller build errors, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 3;
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.starts_with("read config")
        || lower.contains("invalid configuration")
        || lower.contains(" must be ")
    {
        return 2;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if let Some(be) = err.downcast_ref::<BuildError>() {
        match be {
            BuildError::MissingTuningInput => "MissingTuningInput",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        }
    } else if err.downcast_ref::<ControllerError>().is_some() {
        "Controller"
    } else if exit_code_for_error(err) == 2 {
        "Config"
    } else {
        "Error"
    };
    json!({
        "reason": reason,
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
