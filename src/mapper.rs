use crate::calibration::Calibration;
use crate::constants::MS_PER_SECOND;
use crate::error::ServoError;

/// Fraction of a PWM period spent high for `pulse_width` ms at `frequency` Hz.
pub fn duty_cycle_percentage(pulse_width: f64, frequency: u32) -> f64 {
    pulse_width / (MS_PER_SECOND / frequency as f64)
}

/// Linear mapping between servo angle and pulse width.
///
/// Angles are whole degrees in `0..=max_angle`, pulse widths are milliseconds
/// in `min_pulse_width..=max_pulse_width`. Pulse width to angle truncates, so
/// a round trip through both directions may lose up to one degree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionMapper {
    calibration: Calibration,
}

impl PositionMapper {
    pub fn new(calibration: Calibration) -> Self {
        PositionMapper { calibration }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn check_angle(&self, angle: i32) -> Result<(), ServoError> {
        let max_angle = self.calibration.max_angle();
        if !(0..=max_angle).contains(&angle) {
            return Err(ServoError::OutOfRangeAngle { angle, max_angle });
        }
        Ok(())
    }

    pub fn check_pulse_width(&self, pulse_width: f64) -> Result<(), ServoError> {
        let min = self.calibration.min_pulse_width();
        let max = self.calibration.max_pulse_width();
        if !(min..=max).contains(&pulse_width) {
            return Err(ServoError::OutOfRangePulseWidth { pulse_width, min, max });
        }
        Ok(())
    }

    pub fn angle_to_pulse_width(&self, angle: i32) -> Result<f64, ServoError> {
        self.check_angle(angle)?;

        let min = self.calibration.min_pulse_width();
        if angle == 0 {
            return Ok(min);
        }
        if angle == self.calibration.max_angle() {
            return Ok(self.calibration.max_pulse_width());
        }
        let span = self.calibration.max_pulse_width() - min;
        Ok(min + span * (angle as f64 / self.calibration.max_angle() as f64))
    }

    pub fn pulse_width_to_angle(&self, pulse_width: f64) -> Result<i32, ServoError> {
        self.check_pulse_width(pulse_width)?;

        let min = self.calibration.min_pulse_width();
        let span = self.calibration.max_pulse_width() - min;
        let ratio = (pulse_width - min) / span;
        Ok((ratio * self.calibration.max_angle() as f64) as i32)
    }

    /// Duty cycle for `pulse_width` at the calibrated frequency.
    pub fn duty_cycle(&self, pulse_width: f64) -> f64 {
        duty_cycle_percentage(pulse_width, self.calibration.frequency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> PositionMapper {
        PositionMapper::new(Calibration::new(0))
    }

    #[test]
    fn angle_to_pulse_width_endpoints() {
        let mapper = mapper();
        assert_eq!(mapper.angle_to_pulse_width(0), Ok(1.0));
        assert_eq!(mapper.angle_to_pulse_width(90), Ok(1.5));
        assert_eq!(mapper.angle_to_pulse_width(180), Ok(2.0));
    }

    #[test]
    fn pulse_width_to_angle_endpoints() {
        let mapper = mapper();
        assert_eq!(mapper.pulse_width_to_angle(1.0), Ok(0));
        assert_eq!(mapper.pulse_width_to_angle(1.75), Ok(135));
        assert_eq!(mapper.pulse_width_to_angle(2.0), Ok(180));
    }

    #[test]
    fn pulse_width_to_angle_truncates() {
        // 1.999ms is 179.82 degrees
        assert_eq!(mapper().pulse_width_to_angle(1.999), Ok(179));
    }

    #[test]
    fn out_of_range_inputs() {
        let mapper = mapper();
        assert_eq!(
            mapper.angle_to_pulse_width(-1),
            Err(ServoError::OutOfRangeAngle { angle: -1, max_angle: 180 })
        );
        assert_eq!(
            mapper.angle_to_pulse_width(181),
            Err(ServoError::OutOfRangeAngle { angle: 181, max_angle: 180 })
        );
        assert!(matches!(
            mapper.pulse_width_to_angle(0.99),
            Err(ServoError::OutOfRangePulseWidth { .. })
        ));
        assert!(matches!(
            mapper.pulse_width_to_angle(2.01),
            Err(ServoError::OutOfRangePulseWidth { .. })
        ));
        assert!(mapper.pulse_width_to_angle(f64::NAN).is_err());
    }

    #[test]
    fn duty_cycle_is_fraction_of_period() {
        // 50Hz is a 20ms period
        assert!((duty_cycle_percentage(1.5, 50) - 0.075).abs() < 1e-12);
        assert!((duty_cycle_percentage(1.0, 100) - 0.1).abs() < 1e-12);
        assert!((mapper().duty_cycle(2.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn custom_calibration() {
        let mapper = PositionMapper::new(
            Calibration::new(0).with_pulse_range(0.5, 2.5).with_max_angle(270),
        );
        assert_eq!(mapper.angle_to_pulse_width(135), Ok(1.5));
        assert_eq!(mapper.pulse_width_to_angle(2.5), Ok(270));
    }

    #[test]
    fn max_angle_gives_max_pulse_width_exactly() {
        let mapper = PositionMapper::new(
            Calibration::new(0).with_pulse_range(0.7, 2.3).with_max_angle(170),
        );
        assert_eq!(mapper.angle_to_pulse_width(170), Ok(2.3));
    }
}
