//! Decimal rounding shared by volume computations.

/// Round a value half-up to 3 decimal places.
///
/// Every stored volume (item volume, line volume, order total) goes through
/// this exactly once at the point the value is derived, so totals do not
/// accumulate floating drift across large orders.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::round3;

    #[test]
    fn rounds_to_three_places() {
        assert_eq!(round3(1.0 / 3.0), 0.333);
        assert_eq!(round3(2.0 / 3.0), 0.667);
        assert_eq!(round3(1.9999), 2.0);
    }

    #[test]
    fn exact_values_pass_through() {
        assert_eq!(round3(1.0), 1.0);
        assert_eq!(round3(3.125), 3.125);
        assert_eq!(round3(0.0), 0.0);
    }

    #[test]
    fn product_of_dimensions_matches_expected() {
        // 2 x 1 x 0.5 is exactly representable; no rounding artifacts.
        assert_eq!(round3(2.0 * 1.0 * 0.5), 1.0);
    }
}
