//! Cross-task submission handle.
//!
//! [`RaceSet::next`](crate::RaceSet::next) borrows the set mutably, so nothing
//! else can call `submit` while a drain is suspended. A [`Submitter`] gets
//! around that: it stages computations in a lock-free queue and wakes the
//! draining task, which pulls them into the same race on its next poll.

use crate::entry::Staged;
use crate::error::SubmitError;
use crate::id::EntryId;
use crate::tracing_compat::trace;
use crate::wake::Shared;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{Ordering, fence};

/// Cloneable handle that submits computations to a [`RaceSet`](crate::RaceSet).
///
/// Created by [`RaceSet::submitter`](crate::RaceSet::submitter).
pub struct Submitter<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Submitter<T, E>
where
    T: 'static,
    E: 'static,
{
    pub(crate) const fn new(shared: Arc<Shared<T, E>>) -> Self {
        Self { shared }
    }

    /// Stages a computation and returns its id.
    ///
    /// The computation counts toward [`remaining`](crate::RaceSet::remaining)
    /// immediately and is first polled by the set's next drain.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Closed`] if the set has been dropped.
    pub fn submit<F>(&self, computation: F) -> Result<EntryId, SubmitError>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        if self.shared.is_closed() {
            return Err(SubmitError::Closed);
        }
        let id = self.shared.ids.mint();
        // Count first so the set never sees a queued entry it does not count.
        self.shared.staged_len.fetch_add(1, Ordering::AcqRel);
        self.shared.staged.push(Staged::new(id, computation));
        // Pairs with the fence in `Shared::close`. If the set closed while
        // we pushed, nobody else is guaranteed to drain the queue.
        fence(Ordering::SeqCst);
        if self.shared.is_closed() {
            self.shared.discard_staged();
            return Err(SubmitError::Closed);
        }
        trace!(id = %id, "computation staged");
        self.shared.wake_parent();
        Ok(id)
    }
}

impl<T, E> Submitter<T, E> {
    /// Returns true once the owning set has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl<T, E> Clone for Submitter<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Submitter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submitter")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
