//! Settled outcomes.
//!
//! A [`Settled`] is what a computation turns into once it finishes: the id it
//! was submitted under plus its `Result`. The set hands these out in the order
//! computations finish.

use crate::id::EntryId;

/// The outcome of one computation, tagged with the id it was submitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a settled outcome carries the computation's result"]
pub struct Settled<T, E> {
    id: EntryId,
    result: Result<T, E>,
}

impl<T, E> Settled<T, E> {
    pub(crate) const fn new(id: EntryId, result: Result<T, E>) -> Self {
        Self { id, result }
    }

    /// Returns the id the computation was submitted under.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    /// Returns true if the computation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns true if the computation failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.result.is_err()
    }

    /// Borrows the result.
    pub const fn result(&self) -> &Result<T, E> {
        &self.result
    }

    /// Discards the id and returns the result.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }

    /// Splits into id and result.
    pub fn into_parts(self) -> (EntryId, Result<T, E>) {
        (self.id, self.result)
    }

    /// Maps the success value, keeping the id.
    pub fn map<U, F>(self, f: F) -> Settled<U, E>
    where
        F: FnOnce(T) -> U,
    {
        Settled {
            id: self.id,
            result: self.result.map(f),
        }
    }
}
