//! Contract between the servo core and a PWM driver.
//!
//! A driver hands out controllers, a controller opens channels, and a channel
//! is the pin whose duty cycle positions the servo. Dropping a channel or a
//! controller releases it.

use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PwmError {
    #[error("No PWM controller at index {index} ({available} available)")]
    ControllerNotFound { index: usize, available: usize },

    #[error("PWM channel {pin} is unavailable")]
    ChannelUnavailable { pin: u32 },

    #[error("Unsupported PWM frequency: {hz}Hz")]
    UnsupportedFrequency { hz: u32 },

    #[error("Duty cycle {percentage} is outside [0.0, 1.0]")]
    DutyCycleOutOfRange { percentage: f64 },

    #[error("Device error: {0}")]
    Device(String),
}

/// Entry point into a platform's PWM support.
pub trait PwmProvider: Send + Sync {
    type Controller: PwmController;

    /// Whether the platform exposes PWM at all.
    fn is_available(&self) -> bool;

    /// Enumerates the controllers the platform offers, in a stable order.
    fn controllers(&self) -> impl Future<Output = Result<Vec<Self::Controller>, PwmError>> + Send;
}

pub trait PwmController: Send {
    type Channel: PwmChannel;

    fn open_channel(&mut self, pin: u32) -> Result<Self::Channel, PwmError>;

    fn set_frequency(&mut self, hz: u32) -> Result<(), PwmError>;
}

pub trait PwmChannel: Send {
    fn start(&mut self) -> Result<(), PwmError>;

    fn stop(&mut self) -> Result<(), PwmError>;

    /// Sets the active fraction of each period, `0.0..=1.0`.
    fn set_duty_cycle(&mut self, percentage: f64) -> Result<(), PwmError>;
}
