//! Fixed-period driver for `Controller::step`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thermo_traits::{Actuator, Clock, LineTransport, Thermocouple};

use crate::controller::Controller;

#[derive(Debug, Clone)]
pub struct RunParams {
    pub period: Duration,
    /// Stop after this many cycles (`None` runs until shutdown).
    pub max_cycles: Option<u64>,
    /// Stop once the transport reports end of input.
    pub stop_on_eof: bool,
}

impl RunParams {
    pub fn forever(period: Duration) -> Self {
        Self {
            period,
            max_cycles: None,
            stop_on_eof: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    CycleLimit,
    InputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    /// Cycles that finished after their period boundary.
    pub overruns: u64,
    pub stopped_by: StopReason,
}

/// Step the controller once per period until a stop condition holds.
///
/// Deadlines advance by whole periods so the cadence does not drift; after an
/// overrun the schedule restarts from the current time instead of bursting to
/// catch up. `shutdown` is checked before every cycle.
pub fn run<S, A, L, C>(
    controller: &mut Controller<S, A, L>,
    clock: &C,
    params: &RunParams,
    shutdown: &AtomicBool,
) -> RunSummary
where
    S: Thermocouple,
    A: Actuator,
    L: LineTransport,
    C: Clock + ?Sized,
{
    let period = params.period.max(Duration::from_millis(1));
    let mut cycles = 0u64;
    let mut overruns = 0u64;
    let mut deadline = clock.now() + period;

    tracing::info!(period_ms = period.as_millis() as u64, "control loop start");
    let stopped_by = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if let Some(max) = params.max_cycles
            && cycles >= max
        {
            break StopReason::CycleLimit;
        }
        if params.stop_on_eof && controller.transport().is_closed() {
            break StopReason::InputClosed;
        }

        let report = controller.step();
        cycles += 1;
        if !report.is_clean() {
            tracing::debug!(cycle = cycles, ?report, "cycle completed with faults");
        }

        let late = clock.sleep_until(deadline);
        if late.is_zero() {
            deadline += period;
        } else {
            overruns += 1;
            tracing::warn!(
                cycle = cycles,
                late_ms = late.as_millis() as u64,
                "control cycle overran its period"
            );
            deadline = clock.now() + period;
        }
    };

    // leave the heater off on the way out
    if let Err(e) = controller.actuator.drive(0.0) {
        tracing::warn!(error = %e, "failed to zero actuator on stop");
    }
    tracing::info!(cycles, overruns, ?stopped_by, "control loop stopped");
    RunSummary {
        cycles,
        overruns,
        stopped_by,
    }
}

/// Run exactly `n` cycles at the controller's configured period.
pub fn run_cycles<S, A, L, C>(controller: &mut Controller<S, A, L>, clock: &C, n: u64) -> RunSummary
where
    S: Thermocouple,
    A: Actuator,
    L: LineTransport,
    C: Clock + ?Sized,
{
    let params = RunParams {
        period: controller.period(),
        max_cycles: Some(n),
        stop_on_eof: false,
    };
    run(controller, clock, &params, &AtomicBool::new(false))
}
