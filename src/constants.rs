// Calibration defaults
pub const DEFAULT_FREQUENCY_HZ: u32 = 50;
pub const DEFAULT_MIN_PULSE_WIDTH_MS: f64 = 1.0;
pub const DEFAULT_MAX_PULSE_WIDTH_MS: f64 = 2.0;
pub const DEFAULT_MAX_ANGLE: i32 = 180;
pub const DEFAULT_SIGNAL_DURATION: u32 = 40;
pub const DEFAULT_CONTROLLER_INDEX: usize = 0;

// Milliseconds per second, turns a frequency in Hz into a period in ms
pub const MS_PER_SECOND: f64 = 1000.0;

// Property names used by the change feed
pub const PROPERTY_DESIRED_ANGLE: &str = "DesiredAngle";
pub const PROPERTY_DESIRED_PULSE_WIDTH: &str = "DesiredPulseWidth";
