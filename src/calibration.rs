use crate::constants::*;
use crate::error::ServoError;

/// Fixed parameters of one servo on one PWM channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pin_number: u32,
    frequency: u32,
    min_pulse_width: f64,
    max_pulse_width: f64,
    max_angle: i32,
    signal_duration: u32,
}

impl Calibration {
    /// Default calibration (50Hz, 1ms to 2ms, 180 degrees) on the given pin.
    pub fn new(pin_number: u32) -> Self {
        Calibration {
            pin_number,
            frequency: DEFAULT_FREQUENCY_HZ,
            min_pulse_width: DEFAULT_MIN_PULSE_WIDTH_MS,
            max_pulse_width: DEFAULT_MAX_PULSE_WIDTH_MS,
            max_angle: DEFAULT_MAX_ANGLE,
            signal_duration: DEFAULT_SIGNAL_DURATION,
        }
    }

    pub fn with_frequency(mut self, hz: u32) -> Self {
        self.frequency = hz;
        self
    }

    pub fn with_pulse_range(mut self, min_ms: f64, max_ms: f64) -> Self {
        self.min_pulse_width = min_ms;
        self.max_pulse_width = max_ms;
        self
    }

    pub fn with_max_angle(mut self, degrees: i32) -> Self {
        self.max_angle = degrees;
        self
    }

    pub fn with_signal_duration(mut self, duration: u32) -> Self {
        self.signal_duration = duration;
        self
    }

    pub fn validate(&self) -> Result<(), ServoError> {
        if self.frequency == 0 {
            return Err(ServoError::InvalidCalibration("frequency must be positive".into()));
        }
        if !self.min_pulse_width.is_finite() || !self.max_pulse_width.is_finite() {
            return Err(ServoError::InvalidCalibration("pulse widths must be finite".into()));
        }
        if self.min_pulse_width < 0.0 || self.min_pulse_width >= self.max_pulse_width {
            return Err(ServoError::InvalidCalibration(format!(
                "pulse range {}ms..{}ms must satisfy 0 <= min < max",
                self.min_pulse_width, self.max_pulse_width
            )));
        }
        if self.max_angle <= 0 {
            return Err(ServoError::InvalidCalibration(format!(
                "max angle {} must be positive",
                self.max_angle
            )));
        }
        Ok(())
    }

    pub fn pin_number(&self) -> u32 {
        self.pin_number
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn min_pulse_width(&self) -> f64 {
        self.min_pulse_width
    }

    pub fn max_pulse_width(&self) -> f64 {
        self.max_pulse_width
    }

    pub fn max_angle(&self) -> i32 {
        self.max_angle
    }

    /// Reserved for timer-driven pulsing; not used by the mapping.
    pub fn signal_duration(&self) -> u32 {
        self.signal_duration
    }

    /// Pulse width halfway between the bounds, where the servo is centred on
    /// initialization.
    pub fn middle_pulse_width(&self) -> f64 {
        (self.max_pulse_width - self.min_pulse_width) / 2.0 + self.min_pulse_width
    }
}
