use crate::{Result, ScheduleError, SchedulingConfig};

/// Roasting time in whole minutes for a batch of `weight` kilograms:
/// `ceil(weight * rate + base)`.
pub fn compute_duration(weight: f64, cfg: &SchedulingConfig) -> Result<u32> {
    cfg.validate()?;
    if !(weight.is_finite() && weight > 0.0) {
        return Err(ScheduleError::InvalidWeight(weight));
    }
    let minutes = (weight * cfg.rate_minutes_per_kg + cfg.base_minutes).ceil();
    if !(minutes >= 1.0 && minutes <= f64::from(u32::MAX)) {
        return Err(ScheduleError::InvalidWeight(weight));
    }
    Ok(minutes as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_weights() {
        let cfg = SchedulingConfig::default();
        assert_eq!(compute_duration(1.0, &cfg), Ok(30));
        assert_eq!(compute_duration(0.5, &cfg), Ok(25));
        assert_eq!(compute_duration(10.0, &cfg), Ok(120));
        assert_eq!(compute_duration(8.0, &cfg), Ok(100));
    }

    #[test]
    fn fractional_minutes_round_up() {
        let cfg = SchedulingConfig::default();
        assert_eq!(compute_duration(0.25, &cfg), Ok(23));
        assert_eq!(compute_duration(0.01, &cfg), Ok(21));
    }

    #[test]
    fn matches_formula_across_weights() {
        let cfg = SchedulingConfig::default();
        for tenths in 1..=300 {
            let weight = f64::from(tenths) / 10.0;
            let expected = (weight * 10.0 + 20.0).ceil() as u32;
            assert_eq!(compute_duration(weight, &cfg), Ok(expected), "weight {weight}");
        }
    }

    #[test]
    fn is_deterministic() {
        let cfg = SchedulingConfig::default();
        assert_eq!(compute_duration(7.3, &cfg), compute_duration(7.3, &cfg));
    }

    #[test]
    fn rejects_non_positive_and_non_finite_weights() {
        let cfg = SchedulingConfig::default();
        for weight in [0.0, -1.0, -0.5, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(compute_duration(weight, &cfg), Err(ScheduleError::InvalidWeight(_))),
                "weight {weight}"
            );
        }
    }

    #[test]
    fn broken_config_is_reported_as_config_error() {
        let cfg = SchedulingConfig {
            rate_minutes_per_kg: -10.0,
            ..Default::default()
        };
        assert!(matches!(
            compute_duration(5.0, &cfg),
            Err(ScheduleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn honours_custom_rate_and_base() {
        let cfg = SchedulingConfig {
            rate_minutes_per_kg: 6.0,
            base_minutes: 15.0,
            ..Default::default()
        };
        assert_eq!(compute_duration(12.0, &cfg), Ok(87));
    }
}
