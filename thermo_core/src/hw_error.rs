//! Maps `Box<dyn Error>` from trait boundaries to typed `ControllerError`.
//!
//! The traits in `thermo_traits` use `Box<dyn Error + Send + Sync>` so any
//! driver can plug in; this module converts those to our typed error enum, with
//! an optional feature-gated path for `thermo_hardware::HwError` downcasting.

use crate::error::ControllerError;

/// Map an error from a sensor or actuator driver.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ControllerError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<thermo_hardware::error::HwError>() {
            return match hw {
                thermo_hardware::error::HwError::Timeout => ControllerError::Timeout,
                other => ControllerError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        ControllerError::Timeout
    } else {
        ControllerError::Hardware(s)
    }
}

/// Map an error from the line transport.
pub fn map_transport_error(e: &(dyn std::error::Error + 'static)) -> ControllerError {
    ControllerError::Transport(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_text_maps_to_timeout() {
        let e: Box<dyn std::error::Error + Send + Sync> = "spi read timeout".into();
        assert_eq!(map_hw_error(&*e), ControllerError::Timeout);
    }

    #[test]
    fn other_text_maps_to_hardware() {
        let e: Box<dyn std::error::Error + Send + Sync> = "bus fault".into();
        assert_eq!(
            map_hw_error(&*e),
            ControllerError::Hardware("bus fault".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_downcast() {
        let e: Box<dyn std::error::Error + Send + Sync> =
            Box::new(thermo_hardware::error::HwError::Channel(7));
        assert_eq!(
            map_hw_error(&*e),
            ControllerError::HardwareFault("no such tuning channel: 7".into())
        );
    }
}
