//! Error Taxonomy for the Computation Pipeline
//!
//! Three families of failures, per the overall design:
//!
//! - Input validation: malformed filtrations and out-of-range or
//!   unparseable queries. Reported with enough context (line number,
//!   offending value) for the caller to fix the input.
//! - Internal invariant violations: a construction step that cannot
//!   proceed, or an arrangement that disagrees with itself. These abort
//!   the whole computation; a partially-correct arrangement is never
//!   returned.
//! - Resource errors: worker-pool construction failure.
//!
//! All operations are deterministic functions of their input, so nothing
//! here is retried.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input filtration is malformed (non-monotone boundary grades,
    /// out-of-range indices, missing faces).
    #[error("invalid filtration: {detail}")]
    InvalidFiltration { detail: String },

    /// A query angle outside [0, 90] degrees. `line` is the 1-based
    /// position in the query file or batch.
    #[error("line {line}: angle {angle} must be between 0 and 90")]
    AngleOutOfRange { line: usize, angle: f64 },

    /// A query offset that is NaN or infinite.
    #[error("line {line}: offset {offset} must be finite")]
    OffsetNotFinite { line: usize, offset: f64 },

    /// A query line that could not be parsed as `angle offset`.
    #[error("line {line}: could not parse query '{content}'")]
    ParseQuery { line: usize, content: String },

    /// A defect in the construction itself; the computation is aborted.
    #[error("internal invariant violated: {detail}")]
    InvariantViolation { detail: String },

    /// The requested worker pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

impl Error {
    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        Error::InvariantViolation { detail: detail.into() }
    }

    pub(crate) fn filtration(detail: impl Into<String>) -> Self {
        Error::InvalidFiltration { detail: detail.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let e = Error::AngleOutOfRange { line: 4, angle: 100.0 };
        assert_eq!(e.to_string(), "line 4: angle 100 must be between 0 and 90");

        let e = Error::ParseQuery { line: 2, content: "abc".into() };
        assert!(e.to_string().contains("line 2"));
        assert!(e.to_string().contains("abc"));
    }
}
