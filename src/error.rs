//! Error types for servo operations

use crate::pwm::PwmError;
use thiserror::Error;

/// Errors reported by [`ServoController`](crate::ServoController) and
/// [`PositionMapper`](crate::PositionMapper).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServoError {
    #[error("Angle {angle} is out of range, must be between 0 and {max_angle}")]
    OutOfRangeAngle { angle: i32, max_angle: i32 },

    #[error("Pulse width {pulse_width}ms is out of range, must be between {min}ms and {max}ms")]
    OutOfRangePulseWidth { pulse_width: f64, min: f64, max: f64 },

    /// The platform has no PWM capability
    #[error("PWM provider is not available on this platform")]
    ProviderUnavailable,

    /// Controller or channel could not be acquired
    #[error("Initialization failed: {0}")]
    InitializationFailed(#[source] PwmError),

    #[error("Servo is already initialized")]
    AlreadyInitialized,

    #[error("Servo is not initialized")]
    NotInitialized,

    #[error("Servo has been disposed")]
    Disposed,

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    /// A duty-cycle write was rejected by the channel
    #[error("Hardware error: {0}")]
    Hardware(#[source] PwmError),
}
