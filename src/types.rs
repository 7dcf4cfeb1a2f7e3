use strum_macros::{AsRefStr, Display, EnumIter};

/// Observable fields of a servo, named the way UI bindings expect them.
#[derive(Debug, EnumIter, Display, AsRefStr, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Property {
    DesiredAngle,
    DesiredPulseWidth,
}

/// One entry of the change feed: the field that changed and its new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyChange {
    DesiredAngle(i32),
    DesiredPulseWidth(f64),
}

impl PropertyChange {
    pub fn property(&self) -> Property {
        match self {
            PropertyChange::DesiredAngle(_) => Property::DesiredAngle,
            PropertyChange::DesiredPulseWidth(_) => Property::DesiredPulseWidth,
        }
    }
}

/// Angle and pulse width describing the same servo position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub angle: i32,
    pub pulse_width: f64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}
