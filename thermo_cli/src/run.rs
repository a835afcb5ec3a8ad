//! Hardware assembly and control loop execution.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use thermo_core::{ControlCfg, Controller, RunParams, RunSummary};
use thermo_hardware::StreamTransport;
use thermo_traits::{Actuator, LineTransport, MonotonicClock, Thermocouple, TuningInput};

#[derive(Debug, Default)]
pub struct RunOptions {
    pub period_ms: Option<u64>,
    pub cycles: Option<u64>,
    pub exit_on_eof: bool,
    pub port: Option<PathBuf>,
    pub no_prime: bool,
}

struct Hardware {
    sensor: Box<dyn Thermocouple>,
    actuator: Box<dyn Actuator>,
    tuning: Option<Box<dyn TuningInput>>,
}

#[cfg(not(feature = "hardware"))]
fn assemble_hardware(cfg: &thermo_config::Config, control: &ControlCfg) -> eyre::Result<Hardware> {
    use thermo_hardware::{PlantParams, SimulatedPlant, SimulatedTuningInput};

    let plant = SimulatedPlant::new(PlantParams {
        ambient_c: cfg.sim.ambient_c,
        gain_c_per_unit: cfg.sim.gain_c_per_unit,
        loss_per_s: cfg.sim.loss_per_s,
        noise_c: cfg.sim.noise_c,
        dt_s: control.period_ms as f64 / 1000.0,
        fault_after: cfg.sim.fault_after,
    });
    let [p, i, d] = cfg.sim.tuning_raw;
    tracing::info!(ambient_c = cfg.sim.ambient_c, "using simulated plant");
    Ok(Hardware {
        sensor: Box::new(plant.thermocouple()),
        actuator: Box::new(plant.actuator(control.output_min, control.output_max)),
        tuning: Some(Box::new(SimulatedTuningInput::new(p, i, d))),
    })
}

#[cfg(feature = "hardware")]
fn assemble_hardware(_cfg: &thermo_config::Config, control: &ControlCfg) -> eyre::Result<Hardware> {
    use thermo_hardware::{HardwareHeater, Max6675};

    // SPI0/CE0 for the converter, PWM0 at 1 kHz for the heater
    let sensor = Max6675::new(0, 0).wrap_err("open MAX6675 on SPI0")?;
    let actuator =
        HardwareHeater::new(0, 1000.0, control.output_max).wrap_err("open heater PWM channel")?;
    tracing::info!("using MAX6675 thermocouple and PWM heater");
    Ok(Hardware {
        sensor: Box::new(sensor),
        actuator: Box::new(actuator),
        tuning: None,
    })
}

fn open_transport(port: Option<&Path>, max_line_len: usize) -> eyre::Result<Box<dyn LineTransport>> {
    match port {
        Some(path) => {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(path)
                .wrap_err_with(|| format!("open serial port {path:?}"))?;
            let reader = file.try_clone().wrap_err("clone serial port handle")?;
            tracing::info!(port = %path.display(), "command transport on serial port");
            Ok(Box::new(StreamTransport::spawn(reader, file, max_line_len)))
        }
        None => {
            tracing::debug!("command transport on stdin/stdout");
            Ok(Box::new(StreamTransport::stdio(max_line_len)))
        }
    }
}

pub fn run_controller(
    cfg: &thermo_config::Config,
    opts: &RunOptions,
    shutdown: &AtomicBool,
) -> eyre::Result<RunSummary> {
    let mut control: ControlCfg = (&cfg.control).into();
    if let Some(ms) = opts.period_ms {
        control.period_ms = ms;
    }

    let hw = assemble_hardware(cfg, &control)?;
    let port = opts.port.as_deref().or(cfg.serial.port.as_deref().map(Path::new));
    let transport = open_transport(port, cfg.serial.max_line_len)?;

    let mut builder = Controller::builder(hw.sensor, hw.actuator, transport)
        .with_config(cfg)
        .with_control(control);
    if let Some(tuning) = hw.tuning {
        builder = builder.with_tuning_input(tuning);
    }
    let mut controller = builder.build()?;

    let clock = MonotonicClock::new();
    if !opts.no_prime {
        controller.prime(&clock);
    }

    let params = RunParams {
        period: controller.period(),
        max_cycles: opts.cycles,
        stop_on_eof: opts.exit_on_eof,
    };
    Ok(thermo_core::run(&mut controller, &clock, &params, shutdown))
}
