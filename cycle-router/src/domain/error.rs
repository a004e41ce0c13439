//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from feed, graph and IO errors.

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A candidate path needs at least one hop
    #[error("path must contain at least two nodes, got {0}")]
    PathTooShort(usize),

    /// Objective weights are negative, non-finite, overflowing or all zero
    #[error("invalid objective weights: {0}")]
    InvalidWeights(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::PathTooShort(1);
        assert_eq!(
            err.to_string(),
            "path must contain at least two nodes, got 1"
        );

        let err = DomainError::InvalidWeights("all weights are zero".into());
        assert_eq!(
            err.to_string(),
            "invalid objective weights: all weights are zero"
        );
    }
}
