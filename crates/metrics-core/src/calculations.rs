use crate::model_catalog::SERVICE_VALUE_RATE;

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage rounded to two decimals; `0.0` when `whole`
/// is zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * 100.0 * 100.0).round() / 100.0
}

/// Dollar value of `prus` premium request units, rounded to cents.
pub fn service_value(prus: f64) -> f64 {
    round2(prus * SERVICE_VALUE_RATE)
}

/// Upper bounds on agent-mode requests for each heatmap intensity step.
///
/// The intensity of a day is the number of thresholds its request count
/// reaches, giving a 0..=5 scale.
pub const INTENSITY_THRESHOLDS: [u64; 5] = [1, 10, 25, 50, 100];

/// Bucket a daily request count into the 0..=5 heatmap scale.
pub fn intensity_level(requests: u64) -> u8 {
    INTENSITY_THRESHOLDS
        .iter()
        .filter(|&&threshold| requests >= threshold)
        .count() as u8
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(-1.005_1), -1.01);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        // 0.125 is exactly representable.
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 5), 100.0);
        assert_eq!(percentage(0, 5), 0.0);
    }

    #[test]
    fn test_percentage_zero_denominator() {
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn test_service_value() {
        assert_eq!(service_value(15.0), 0.6);
        assert_eq!(service_value(0.0), 0.0);
        assert_eq!(service_value(333.0), 13.32);
    }

    #[test]
    fn test_intensity_levels() {
        assert_eq!(intensity_level(0), 0);
        assert_eq!(intensity_level(1), 1);
        assert_eq!(intensity_level(9), 1);
        assert_eq!(intensity_level(10), 2);
        assert_eq!(intensity_level(24), 2);
        assert_eq!(intensity_level(25), 3);
        assert_eq!(intensity_level(50), 4);
        assert_eq!(intensity_level(99), 4);
        assert_eq!(intensity_level(100), 5);
        assert_eq!(intensity_level(10_000), 5);
    }
}
