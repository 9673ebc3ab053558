//! Fixed-capacity sample window
//!
//! Holds the last N metric averages per series in arrival order, evicting
//! the oldest sample once the configured capacity is reached.

use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::error::DetectError;

/// Insertion-ordered buffer of the most recent samples for one metric
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Decimal>,
    capacity: usize,
}

impl SampleWindow {
    /// Create a window holding at most `capacity` samples (must be >= 1)
    pub fn new(capacity: usize) -> Result<Self, DetectError> {
        if capacity == 0 {
            return Err(DetectError::InvalidConfig {
                reason: "window capacity must be at least 1".to_string(),
            });
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a sample, evicting the oldest if the window is at capacity
    pub fn push(&mut self, sample: Decimal) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Snapshot of the samples in chronological order
    pub fn values(&self) -> Vec<Decimal> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The window has accumulated exactly its configured capacity of samples
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard all accumulated samples (fault reset)
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(SampleWindow::new(0).is_err());
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut window = SampleWindow::new(3).unwrap();
        assert!(!window.is_full());

        window.push(dec(1));
        window.push(dec(2));
        assert_eq!(window.len(), 2);
        assert!(!window.is_full());

        window.push(dec(3));
        assert!(window.is_full());
        assert_eq!(window.values(), vec![dec(1), dec(2), dec(3)]);
    }

    #[test]
    fn test_eviction_keeps_last_k_in_push_order() {
        let mut window = SampleWindow::new(3).unwrap();
        for v in 1..=4 {
            window.push(dec(v));
        }

        // Oldest of the first three is gone; the rest keep arrival order
        assert_eq!(window.len(), 3);
        assert_eq!(window.values(), vec![dec(2), dec(3), dec(4)]);

        window.push(dec(5));
        assert_eq!(window.values(), vec![dec(3), dec(4), dec(5)]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut window = SampleWindow::new(2).unwrap();
        for v in 0..100 {
            window.push(dec(v));
            assert!(window.len() <= 2);
        }
        assert_eq!(window.values(), vec![dec(98), dec(99)]);
    }

    #[test]
    fn test_clear_resets_fill_state() {
        let mut window = SampleWindow::new(2).unwrap();
        window.push(dec(1));
        window.push(dec(2));
        assert!(window.is_full());

        window.clear();
        assert!(window.is_empty());
        assert!(!window.is_full());
        assert_eq!(window.capacity(), 2);
    }
}
