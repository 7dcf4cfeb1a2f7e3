mod calibration;
mod constants;
mod controller;
mod error;
mod mapper;
mod notify;
mod types;

pub mod pwm;
pub mod sim;

pub use calibration::Calibration;
pub use controller::ServoController;
pub use error::ServoError;
pub use mapper::{duty_cycle_percentage, PositionMapper};
pub use notify::ChangeNotifier;
pub use types::{LifecycleState, Position, Property, PropertyChange};

// Re-export commonly used items
pub use constants::{
    DEFAULT_FREQUENCY_HZ, DEFAULT_MAX_ANGLE, DEFAULT_MAX_PULSE_WIDTH_MS, DEFAULT_MIN_PULSE_WIDTH_MS,
    PROPERTY_DESIRED_ANGLE, PROPERTY_DESIRED_PULSE_WIDTH,
};
