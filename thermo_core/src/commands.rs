//! The controller's command set and its handlers.
//!
//! | long form                  | short form      |
//! |----------------------------|-----------------|
//! | `*IDN?`                    |                 |
//! | `*CLS`                     |                 |
//! | `SYSTEM:ERROR[:NEXT]?`     | `SYST:ERR?`     |
//! | `SYSTEM:ERROR:COUNT?`      | `SYST:ERR:COUN?`|
//! | `CONTROLLER:TEMPERATURE?`  | `CTRL:TEMP?`    |
//! | `CONTROLLER:COEFFICIENTS?` | `CTRL:COEFF?`   |
//! | `CONTROLLER:SETPOINT <v>`  | `CTRL:SET <v>`  |
//! | `CONTROLLER:SETPOINT?`     | `CTRL:SET?`     |
//! | `CONTROLLER:OUTPUT?`       | `CTRL:OUT?`     |
//! | `CONTROLLER:STATE?`        | `CTRL:STAT?`    |
//! | `CONTROLLER:ENABLE`        | `CTRL:ON`       |
//! | `CONTROLLER:DISABLE`       | `CTRL:OFF`      |
//!
//! Handlers never fail at the command level. A refused request yields an
//! [`ErrorRecord`] in [`CommandOutcome::error`] for the caller to queue, and
//! leaves the controller state as it was.

use crate::config::SetpointLimits;
use crate::error_queue::{ErrorQueue, ErrorRecord};
use crate::numeric::{NumericError, parse_numeric};
use crate::router::{CommandTree, NodeId, Scope, Token, first_argument};
use crate::state::{ControllerState, Mode};

pub const IDENTITY: &str = "OIC,Embedded SCPI Example,1,10";

/// Unit accepted on setpoint arguments.
pub const TEMPERATURE_UNIT: &str = "C";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Identify,
    ClearStatus,
    NextError,
    ErrorCount,
    GetTemperature,
    GetCoefficients,
    SetSetpoint,
    GetSetpoint,
    GetOutput,
    GetState,
    Enable,
    Disable,
}

/// Build the controller's command tree.
pub fn build_command_tree() -> CommandTree {
    let mut b = CommandTree::builder();
    let root = NodeId::ROOT;

    b.register(root, Scope::SameLevel, "*IDN?", "*IDN?", Some(Handler::Identify));
    b.register(root, Scope::SameLevel, "*CLS", "*CLS", Some(Handler::ClearStatus));

    let system = b.register(root, Scope::Child, "SYSTEM", "SYST", None);
    b.register(system, Scope::Child, "ERROR?", "ERR?", Some(Handler::NextError));
    let error = b.register(system, Scope::Child, "ERROR", "ERR", None);
    b.register(error, Scope::Child, "NEXT?", "NEXT?", Some(Handler::NextError));
    b.register(error, Scope::Child, "COUNT?", "COUN?", Some(Handler::ErrorCount));

    let controller = b.register(root, Scope::Child, "CONTROLLER", "CTRL", None);
    b.register(controller, Scope::Child, "TEMPERATURE?", "TEMP?", Some(Handler::GetTemperature));
    b.register(controller, Scope::Child, "COEFFICIENTS?", "COEFF?", Some(Handler::GetCoefficients));
    b.register(controller, Scope::Child, "SETPOINT", "SET", Some(Handler::SetSetpoint));
    b.register(controller, Scope::Child, "SETPOINT?", "SET?", Some(Handler::GetSetpoint));
    b.register(controller, Scope::Child, "OUTPUT?", "OUT?", Some(Handler::GetOutput));
    b.register(controller, Scope::Child, "STATE?", "STAT?", Some(Handler::GetState));
    b.register(controller, Scope::Child, "ENABLE", "ON", Some(Handler::Enable));
    b.register(controller, Scope::Child, "DISABLE", "OFF", Some(Handler::Disable));

    b.build()
}

/// What a handler may touch.
pub struct CommandContext<'a> {
    pub state: &'a mut ControllerState,
    pub errors: &'a mut ErrorQueue,
    pub limits: &'a SetpointLimits,
}

/// Result of one command: an optional response line and an optional error to queue.
///
/// Completion is implied; there is no failure variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub response: Option<String>,
    pub error: Option<ErrorRecord>,
}

impl CommandOutcome {
    fn done() -> Self {
        Self::default()
    }

    fn respond(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            error: None,
        }
    }

    fn refuse(error: ErrorRecord) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }
}

/// One fractional digit, as the controller reports every temperature.
///
/// Anything that rounds to zero prints as `0.0`, never `-0.0`.
pub fn format_decimal(v: f64) -> String {
    let s = format!("{v:.1}");
    if s == "-0.0" { "0.0".to_string() } else { s }
}

pub fn execute(handler: Handler, args: &[Token<'_>], ctx: &mut CommandContext<'_>) -> CommandOutcome {
    match handler {
        Handler::Identify => CommandOutcome::respond(IDENTITY),
        Handler::ClearStatus => {
            ctx.errors.clear();
            CommandOutcome::done()
        }
        Handler::NextError => CommandOutcome::respond(ctx.errors.next_or_none().to_string()),
        Handler::ErrorCount => CommandOutcome::respond(ctx.errors.len().to_string()),
        Handler::GetTemperature => CommandOutcome::respond(format_decimal(ctx.state.temperature())),
        Handler::GetCoefficients => CommandOutcome::respond(ctx.state.coefficients().to_string()),
        Handler::SetSetpoint => match validate_setpoint(args, ctx.limits) {
            Ok(value) => {
                ctx.state.commit_setpoint(value);
                tracing::info!(setpoint = value, "setpoint updated");
                CommandOutcome::done()
            }
            Err(record) => {
                tracing::debug!(code = record.code, "setpoint refused");
                CommandOutcome::refuse(record)
            }
        },
        Handler::GetSetpoint => CommandOutcome::respond(format_decimal(ctx.state.setpoint())),
        Handler::GetOutput => CommandOutcome::respond(format_decimal(ctx.state.output())),
        Handler::GetState => CommandOutcome::respond(match ctx.state.mode() {
            Mode::Automatic => "1",
            Mode::Manual => "0",
        }),
        Handler::Enable => {
            ctx.state.enable();
            CommandOutcome::done()
        }
        Handler::Disable => {
            ctx.state.disable();
            CommandOutcome::done()
        }
    }
}

/// Check a setpoint argument against unit and range rules.
///
/// Returns the value to commit, or the single error record explaining the refusal.
pub fn validate_setpoint(args: &[Token<'_>], limits: &SetpointLimits) -> Result<f64, ErrorRecord> {
    let token = first_argument(args).ok_or(ErrorRecord::missing_parameter())?;
    let value = parse_numeric(token).map_err(|e| match e {
        NumericError::NoMantissa(_) | NumericError::NotFinite => ErrorRecord::data_type(),
    })?;
    if let Some(unit) = value.unit.as_deref()
        && unit != TEMPERATURE_UNIT
    {
        return Err(ErrorRecord::invalid_unit());
    }
    if value.magnitude < limits.min {
        return Err(ErrorRecord::below_minimum());
    }
    if value.magnitude > limits.max {
        return Err(ErrorRecord::above_maximum());
    }
    // -0 commits as 0
    Ok(value.magnitude + 0.0)
}
