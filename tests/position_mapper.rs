use proptest::prelude::*;
use pwm_servo::{Calibration, PositionMapper, ServoError};

fn default_mapper() -> PositionMapper {
    PositionMapper::new(Calibration::new(0))
}

#[test]
fn endpoints_are_exact() {
    let mapper = default_mapper();
    assert_eq!(mapper.angle_to_pulse_width(0), Ok(1.0));
    assert_eq!(mapper.pulse_width_to_angle(1.0), Ok(0));
    assert_eq!(mapper.pulse_width_to_angle(2.0), Ok(180));
    let max = mapper.angle_to_pulse_width(180).unwrap();
    assert!((max - 2.0).abs() < 1e-12);
}

#[test]
fn round_trip_loses_at_most_one_degree() {
    let mapper = default_mapper();
    let mut exact = 0;
    for angle in 1..=180 {
        let pulse_width = mapper.angle_to_pulse_width(angle).unwrap();
        let back = mapper.pulse_width_to_angle(pulse_width).unwrap();
        assert!(back == angle || back == angle - 1, "{} came back as {}", angle, back);
        if back == angle {
            exact += 1;
        }
    }
    // Truncation only bites where the float lands just under the whole degree
    assert!(exact > 90, "only {} of 180 angles survived the round trip", exact);
}

proptest! {
    #[test]
    fn angle_to_pulse_width_stays_in_range(
        min in 0.1f64..2.0,
        span in 0.1f64..3.0,
        max_angle in 1i32..=360,
        fraction in 0.0f64..=1.0,
    ) {
        let mapper = PositionMapper::new(
            Calibration::new(0).with_pulse_range(min, min + span).with_max_angle(max_angle),
        );
        let angle = (fraction * max_angle as f64) as i32;
        let pulse_width = mapper.angle_to_pulse_width(angle).unwrap();
        prop_assert!(pulse_width >= min);
        prop_assert!(pulse_width <= mapper.calibration().max_pulse_width());
    }

    #[test]
    fn round_trip_never_gains(
        max_angle in 1i32..=360,
        fraction in 0.0f64..=1.0,
    ) {
        let mapper = PositionMapper::new(Calibration::new(0).with_max_angle(max_angle));
        let angle = (fraction * max_angle as f64) as i32;
        let pulse_width = mapper.angle_to_pulse_width(angle).unwrap();
        prop_assert!(pulse_width <= mapper.calibration().max_pulse_width());
        let back = mapper.pulse_width_to_angle(pulse_width).unwrap();
        prop_assert!(back <= angle);
        prop_assert!(angle - back <= 1);
    }

    #[test]
    fn pulse_width_to_angle_is_monotonic(a in 1.0f64..=2.0, b in 1.0f64..=2.0) {
        let mapper = default_mapper();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(mapper.pulse_width_to_angle(low).unwrap() <= mapper.pulse_width_to_angle(high).unwrap());
    }

    #[test]
    fn angles_outside_range_are_rejected(angle in prop_oneof![i32::MIN..0, 181i32..=i32::MAX]) {
        prop_assert_eq!(
            default_mapper().angle_to_pulse_width(angle),
            Err(ServoError::OutOfRangeAngle { angle, max_angle: 180 })
        );
    }

    #[test]
    fn pulse_widths_outside_range_are_rejected(
        pulse_width in prop_oneof![-100.0f64..0.999_999, 2.000_001f64..100.0],
    ) {
        let is_out_of_range = matches!(
            default_mapper().pulse_width_to_angle(pulse_width),
            Err(ServoError::OutOfRangePulseWidth { .. })
        );
        prop_assert!(is_out_of_range);
    }
}
