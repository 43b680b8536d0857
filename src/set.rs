//! The completion-order multiplexer.
//!
//! [`RaceSet`] holds a growing set of computations and hands their outcomes
//! back one at a time, in the order they actually finish.
//!
//! # Example
//!
//! ```
//! use futures_lite::future::block_on;
//! use raceset::RaceSet;
//!
//! let mut set: RaceSet<u32, String> = RaceSet::new();
//! set.submit(async { Ok(1) });
//! set.submit(async { Err("no".to_string()) });
//!
//! block_on(async {
//!     let mut values = Vec::new();
//!     let mut failures = 0;
//!     loop {
//!         match set.next().await {
//!             Ok(Some(v)) => values.push(v),
//!             Ok(None) => break,
//!             Err(_) => failures += 1,
//!         }
//!     }
//!     assert_eq!(values, vec![1]);
//!     assert_eq!(failures, 1);
//! });
//! ```
//!
//! # Polling model
//!
//! Every entry owns a waker that, when fired, queues the entry's id and wakes
//! the task driving the set. A poll of [`RaceSet::next`] only polls queued
//! entries, so the race is re-run over exactly the current pending set each
//! time. Queued ids whose entry is already gone are skipped.

use crate::entry::{PendingEntry, Staged};
use crate::id::EntryId;
use crate::outcome::Settled;
use crate::submitter::Submitter;
use crate::tracing_compat::{debug, trace};
use crate::wake::Shared;
use futures_lite::Stream;
use hashbrown::HashMap;
use slab::Slab;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::task::{Context, Poll, Waker};

/// A set of computations drained in completion order.
///
/// `T` is the success type and `E` the failure payload shared by every
/// computation in the set. Failures are returned verbatim.
#[must_use = "a race set does nothing unless drained"]
pub struct RaceSet<T, E> {
    /// Pending entries; slot keys are recycled.
    entries: Slab<PendingEntry<T, E>>,
    /// Identity index: entry id to slab key.
    index: HashMap<EntryId, usize>,
    shared: Arc<Shared<T, E>>,
}

impl<T, E> RaceSet<T, E>
where
    T: 'static,
    E: 'static,
{
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty set with room for `capacity` pending computations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            shared: Arc::new(Shared::new()),
        }
    }

    /// Registers a computation and returns the id it was tagged with.
    ///
    /// Never blocks or fails. The computation is first polled by the next
    /// drain.
    pub fn submit<F>(&mut self, computation: F) -> EntryId
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let id = self.shared.ids.mint();
        self.insert(Staged::new(id, computation));
        trace!(id = %id, remaining = self.remaining(), "computation submitted");
        id
    }

    /// Returns a handle that can submit from other tasks or threads, including
    /// while a drain is suspended.
    pub fn submitter(&self) -> Submitter<T, E> {
        Submitter::new(Arc::clone(&self.shared))
    }

    /// Waits for the next computation to settle and returns its value.
    ///
    /// Resolves to `Ok(None)` right away when nothing is pending, and to
    /// `Err` with the computation's own payload when the settled computation
    /// failed. Either way the settled computation is gone from the set.
    pub fn next(&mut self) -> Next<'_, T, E> {
        Next { set: self }
    }

    /// Like [`next`](Self::next), but yields the tagged outcome.
    pub fn next_settled(&mut self) -> NextSettled<'_, T, E> {
        NextSettled { set: self }
    }

    /// Drains one already-settled computation without suspending.
    ///
    /// Returns `None` if nothing is pending or nothing has settled yet.
    pub fn try_next(&mut self) -> Option<Result<T, E>> {
        let mut cx = Context::from_waker(Waker::noop());
        match self.poll_next_settled(&mut cx) {
            Poll::Ready(Some(settled)) => Some(settled.into_result()),
            Poll::Ready(None) | Poll::Pending => None,
        }
    }

    /// Polls for the next settled computation.
    ///
    /// Returns `Poll::Ready(None)` when the set is empty. After `Pending`, the
    /// waker in `cx` is woken once a pending computation makes progress or a
    /// submitter stages new work.
    pub fn poll_next_settled(&mut self, cx: &mut Context<'_>) -> Poll<Option<Settled<T, E>>> {
        // Register before absorbing or draining so no wake can slip between.
        self.shared.register(cx.waker());
        self.absorb_staged();

        if self.remaining() == 0 {
            return Poll::Ready(None);
        }

        // Bounded so a computation that keeps waking itself cannot hold the
        // caller here forever.
        let budget = self.entries.len();
        let mut polled = 0usize;
        loop {
            if budget > 0 && polled >= budget {
                // Only re-queued entries justify another pass.
                if !self.shared.ready.is_empty() {
                    trace!(polled, "ready budget exhausted, yielding");
                    cx.waker().wake_by_ref();
                }
                return Poll::Pending;
            }
            let Some(id) = self.shared.ready.pop() else {
                return Poll::Pending;
            };
            let Some(&key) = self.index.get(&id) else {
                continue;
            };
            let Some(entry) = self.entries.get_mut(key) else {
                debug_assert!(false, "identity index points at empty slot {key}");
                continue;
            };

            if let Poll::Ready(settled) = entry.poll() {
                self.remove(key, id);
                debug!(
                    id = %id,
                    success = settled.is_success(),
                    remaining = self.remaining(),
                    "computation settled"
                );
                return Poll::Ready(Some(settled));
            }

            polled += 1;
        }
    }

    /// Moves computations staged by submitters into the set.
    fn absorb_staged(&mut self) {
        while let Some(staged) = self.shared.staged.pop() {
            trace!(id = %staged.id(), "absorbing staged computation");
            self.insert(staged);
            // Decrement after insertion so `remaining` never dips.
            self.shared.staged_len.fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Inserts into slab and identity index together.
    fn insert(&mut self, staged: Staged<T, E>) {
        let id = staged.id();
        let key = self.entries.insert(staged.activate(&self.shared));
        let previous = self.index.insert(id, key);
        debug_assert!(previous.is_none(), "entry id {id} reused");
    }

    /// Removes from slab and identity index together.
    fn remove(&mut self, key: usize, id: EntryId) {
        self.index.remove(&id);
        let entry = self.entries.remove(key);
        debug_assert_eq!(entry.id(), id);
    }
}

impl<T, E> RaceSet<T, E> {
    /// Number of computations submitted and not yet drained.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len() + self.shared.staged_len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns true if the computation with this id is in the set and has not
    /// been drained. Computations still staged by a submitter report false.
    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.index.contains_key(&id)
    }
}

impl<T, E> Default for RaceSet<T, E>
where
    T: 'static,
    E: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Drop for RaceSet<T, E> {
    fn drop(&mut self) {
        // Staged computations would otherwise live as long as a submitter.
        self.shared.close();
    }
}

impl<T, E> fmt::Debug for RaceSet<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaceSet")
            .field("pending", &self.entries.len())
            .field("staged", &self.shared.staged_len())
            .finish_non_exhaustive()
    }
}

impl<T, E, F> Extend<F> for RaceSet<T, E>
where
    T: 'static,
    E: 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    fn extend<I: IntoIterator<Item = F>>(&mut self, iter: I) {
        for computation in iter {
            self.submit(computation);
        }
    }
}

/// Ends whenever the set is empty; submitting more work revives it.
impl<T, E> Stream for RaceSet<T, E>
where
    T: 'static,
    E: 'static,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut()
            .poll_next_settled(cx)
            .map(|settled| settled.map(Settled::into_result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

/// Future returned by [`RaceSet::next`].
#[must_use = "futures do nothing unless polled"]
pub struct Next<'a, T, E> {
    set: &'a mut RaceSet<T, E>,
}

impl<T, E> Future for Next<'_, T, E>
where
    T: 'static,
    E: 'static,
{
    type Output = Result<Option<T>, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.set
            .poll_next_settled(cx)
            .map(|settled| settled.map(Settled::into_result).transpose())
    }
}

impl<T, E> fmt::Debug for Next<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("set", &self.set).finish()
    }
}

/// Future returned by [`RaceSet::next_settled`].
#[must_use = "futures do nothing unless polled"]
pub struct NextSettled<'a, T, E> {
    set: &'a mut RaceSet<T, E>,
}

impl<T, E> Future for NextSettled<'_, T, E>
where
    T: 'static,
    E: 'static,
{
    type Output = Option<Settled<T, E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.set.poll_next_settled(cx)
    }
}

impl<T, E> fmt::Debug for NextSettled<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NextSettled")
            .field("set", &self.set)
            .finish()
    }
}
