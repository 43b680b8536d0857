//! Error types.
//!
//! Failures of submitted computations are never wrapped: their payload comes
//! back verbatim from [`RaceSet::next`](crate::RaceSet::next). The only error
//! the crate itself produces is [`SubmitError`].

use thiserror::Error;

/// Error returned by [`Submitter::submit`](crate::Submitter::submit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The owning set was dropped; the computation was discarded.
    #[error("race set closed")]
    Closed,
}
