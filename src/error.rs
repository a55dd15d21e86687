//! Error type shared by every module of the crate.

use thiserror::Error;

/// Errors reported by run setup and by the evolutionary loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TspError {
    /// The problem instance or run parameters cannot start a run.
    ///
    /// Always reported before the first generation.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An operator produced a tour that is not a permutation of `0..n`
    /// or that moved a pinned city.
    ///
    /// This is a defect in the operator, not a recoverable condition;
    /// the run is aborted.
    #[error("{operator} broke the tour invariant at generation {generation}: {detail}")]
    InvariantViolation {
        operator: &'static str,
        generation: usize,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, TspError>;

impl TspError {
    /// Builds a [`TspError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Builds a [`TspError::InvariantViolation`].
    pub fn invariant(operator: &'static str, generation: usize, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            operator,
            generation,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = TspError::configuration("city count must be at least 4, got 3");
        assert_eq!(
            err.to_string(),
            "invalid configuration: city count must be at least 4, got 3"
        );
    }

    #[test]
    fn test_invariant_message_names_operator_and_generation() {
        let err = TspError::invariant("crossover", 7, "city 3 appears twice");
        let msg = err.to_string();
        assert!(msg.contains("crossover"), "{msg}");
        assert!(msg.contains("generation 7"), "{msg}");
        assert!(msg.contains("city 3 appears twice"), "{msg}");
    }
}
