#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Temperature controller core (hardware-agnostic).
//!
//! All hardware interaction goes through the `thermo_traits` collaborators:
//! `Thermocouple`, `Actuator`, `TuningInput` and `LineTransport`.
//!
//! ## Architecture
//!
//! - **Commands**: hierarchical command tree (`router`) bound to a closed set
//!   of handlers (`commands`), with numeric-with-unit argument parsing
//!   (`numeric`) and a bounded error queue (`error_queue`)
//! - **Control**: exponential smoothing (`filter`), PID (`pid`) and dial
//!   sampling (`tuning`), sequenced per cycle by `Controller::step`
//! - **State**: one owned `ControllerState`, handed to handlers by `&mut`
//! - **Pacing**: `runner::run` steps the controller at a fixed period

pub mod builder;
pub mod commands;
pub mod config;
pub mod controller;
mod conversions;
pub mod error;
pub mod error_queue;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod numeric;
pub mod pid;
pub mod router;
pub mod runner;
pub mod state;
pub mod status;
pub mod tuning;

pub use builder::ControllerBuilder;
pub use commands::{Handler, IDENTITY};
pub use config::{ControlCfg, FilterCfg, ProtocolCfg, SetpointLimits, TuningCfg, TuningMode};
pub use controller::Controller;
pub use error::{BuildError, ControllerError};
pub use error_queue::{ErrorQueue, ErrorRecord};
pub use runner::{RunParams, RunSummary, StopReason, run, run_cycles};
pub use state::{Coefficients, ControllerState, Mode};
pub use status::CycleReport;
