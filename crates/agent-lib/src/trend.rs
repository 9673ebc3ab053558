//! Trend classification predicates
//!
//! Classifies a chronological run of samples as monotonically non-increasing
//! ("decaying") or non-decreasing ("raising"). Equal neighbors do not break
//! monotonicity; windows of fewer than two samples classify as neither.

use rust_decimal::Decimal;

/// True iff the samples never increase in chronological order
pub fn is_decaying(values: &[Decimal]) -> bool {
    if values.len() < 2 {
        return false;
    }
    values.windows(2).all(|pair| pair[1] <= pair[0])
}

/// True iff the samples never decrease in chronological order
pub fn is_raising(values: &[Decimal]) -> bool {
    if values.len() < 2 {
        return false;
    }
    values.windows(2).all(|pair| pair[1] >= pair[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decs(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    #[test]
    fn test_short_sequences_are_neither() {
        assert!(!is_decaying(&[]));
        assert!(!is_raising(&[]));
        assert!(!is_decaying(&decs(&[5])));
        assert!(!is_raising(&decs(&[5])));
    }

    #[test]
    fn test_strictly_decreasing_is_decaying() {
        assert!(is_decaying(&decs(&[30, 28, 25])));
        assert!(!is_raising(&decs(&[30, 28, 25])));
    }

    #[test]
    fn test_strictly_increasing_is_raising() {
        assert!(is_raising(&decs(&[10, 15, 20])));
        assert!(!is_decaying(&decs(&[10, 15, 20])));
    }

    #[test]
    fn test_equal_neighbors_pass_both() {
        // Ties never break monotonicity
        assert!(is_decaying(&decs(&[10, 10, 9, 9])));
        assert!(is_raising(&decs(&[3, 3, 4, 4])));

        let flat = decs(&[7, 7, 7]);
        assert!(is_decaying(&flat));
        assert!(is_raising(&flat));
    }

    #[test]
    fn test_single_break_fails() {
        // One strict increase anywhere breaks decay
        assert!(!is_decaying(&decs(&[30, 28, 29, 25])));
        // One strict decrease anywhere breaks raise
        assert!(!is_raising(&decs(&[10, 15, 14, 20])));
    }

    #[test]
    fn test_zero_valued_samples_still_compared() {
        // A zero sample participates in the scan like any other value
        assert!(is_decaying(&decs(&[2, 0, 0])));
        assert!(!is_decaying(&decs(&[2, 0, 1])));
        assert!(is_raising(&decs(&[0, 0, 1])));
    }

    #[test]
    fn test_fractional_samples() {
        let values = vec![
            Decimal::new(255, 1), // 25.5
            Decimal::new(255, 1), // 25.5
            Decimal::new(254, 1), // 25.4
        ];
        assert!(is_decaying(&values));
        assert!(!is_raising(&values));
    }
}
