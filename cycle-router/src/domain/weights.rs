//! Objective weights for route selection.

use serde::Serialize;

use super::error::DomainError;

/// Relative importance of distance, safety and comfort.
///
/// Weights need not sum to one. All-zero weights mean "distance only" to
/// the planner, but are rejected by the selector itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ObjectiveWeights {
    pub distance: f64,
    pub safety: f64,
    pub comfort: f64,
}

impl ObjectiveWeights {
    pub fn new(distance: f64, safety: f64, comfort: f64) -> Self {
        Self {
            distance,
            safety,
            comfort,
        }
    }

    /// Weights that rank purely by length.
    pub fn distance_only() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// True when no objective carries any weight.
    pub fn is_zero(&self) -> bool {
        self.distance == 0.0 && self.safety == 0.0 && self.comfort == 0.0
    }

    /// Check every weight is finite and non-negative, and that they can be
    /// summed without overflowing.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("distance", self.distance),
            ("safety", self.safety),
            ("comfort", self.comfort),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidWeights(format!(
                    "{name} weight must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.total().is_finite() {
            return Err(DomainError::InvalidWeights(
                "weights are too large to combine".to_string(),
            ));
        }
        Ok(())
    }

    fn total(&self) -> f64 {
        self.distance + self.safety + self.comfort
    }

    /// Scale the weights to sum to one.
    ///
    /// All-zero weights are returned unchanged.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return *self;
        }
        Self::new(
            self.distance / total,
            self.safety / total,
            self.comfort / total,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_detection() {
        assert!(ObjectiveWeights::default().is_zero());
        assert!(!ObjectiveWeights::distance_only().is_zero());
    }

    #[test]
    fn validate_rejects_negative_and_nan() {
        assert!(ObjectiveWeights::new(0.5, 0.3, 0.2).validate().is_ok());
        assert!(ObjectiveWeights::new(-0.1, 0.3, 0.2).validate().is_err());
        assert!(ObjectiveWeights::new(0.1, f64::NAN, 0.2).validate().is_err());
        assert!(ObjectiveWeights::new(0.1, 0.3, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn validate_rejects_overflowing_sum() {
        let err = ObjectiveWeights::new(1e308, 1e308, 0.0).validate().unwrap_err();

        assert_eq!(err.to_string(), "invalid objective weights: weights are too large to combine");
        assert!(ObjectiveWeights::new(1e307, 1e307, 1e307).validate().is_ok());
    }

    #[test]
    fn normalized_sums_to_one() {
        let w = ObjectiveWeights::new(2.0, 1.0, 1.0).normalized();
        assert_eq!(w, ObjectiveWeights::new(0.5, 0.25, 0.25));
    }

    #[test]
    fn normalized_keeps_zero_weights() {
        let w = ObjectiveWeights::default().normalized();
        assert!(w.is_zero());
    }
}
