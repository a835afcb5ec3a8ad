use thiserror::Error;

/// Failures surfaced by collaborators during a control cycle.
///
/// None of these stop the loop; they are logged and reported in `CycleReport`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControllerError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("analog tuning selected but no tuning input was provided")]
    MissingTuningInput,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
