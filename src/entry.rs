//! Pending entries.
//!
//! A submitted computation is wrapped in [`Tagged`], which attaches the entry's
//! id to whatever the computation produces, then boxed so computations of
//! different concrete types can live in one set. [`Staged`] is the form a
//! computation takes between a [`Submitter`](crate::Submitter) handing it in
//! and the set moving it into its slab; [`PendingEntry`] is the form it takes
//! inside the slab.

use crate::id::EntryId;
use crate::outcome::Settled;
use crate::wake::{EntryWaker, Shared};
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

type BoxedSettle<T, E> = Pin<Box<dyn Future<Output = Settled<T, E>> + Send>>;

/// Future adapter that tags a computation's result with its entry id.
///
/// Tagging happens when the inner future resolves; constructing the adapter
/// does no work.
#[pin_project]
#[must_use = "futures do nothing unless polled"]
pub(crate) struct Tagged<F> {
    id: EntryId,
    #[pin]
    inner: F,
}

impl<F> Tagged<F> {
    pub(crate) const fn new(id: EntryId, inner: F) -> Self {
        Self { id, inner }
    }
}

impl<F, T, E> Future for Tagged<F>
where
    F: Future<Output = Result<T, E>>,
{
    type Output = Settled<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let id = *this.id;
        this.inner.poll(cx).map(|result| Settled::new(id, result))
    }
}

/// A tagged, type-erased computation that has not reached the slab yet.
pub(crate) struct Staged<T, E> {
    id: EntryId,
    future: BoxedSettle<T, E>,
}

impl<T, E> Staged<T, E>
where
    T: 'static,
    E: 'static,
{
    pub(crate) fn new<F>(id: EntryId, future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            id,
            future: Box::pin(Tagged::new(id, future)),
        }
    }

    pub(crate) const fn id(&self) -> EntryId {
        self.id
    }

    /// Turns the staged computation into a slab entry, queueing it for its
    /// first poll.
    pub(crate) fn activate(self, shared: &Arc<Shared<T, E>>) -> PendingEntry<T, E> {
        let waker = EntryWaker::new_queued(self.id, Arc::clone(shared));
        PendingEntry {
            id: self.id,
            future: self.future,
            notify: Arc::clone(&waker),
            waker: Waker::from(waker),
        }
    }
}

/// One in-flight computation stored in the set.
pub(crate) struct PendingEntry<T, E> {
    id: EntryId,
    future: BoxedSettle<T, E>,
    notify: Arc<EntryWaker<T, E>>,
    /// `notify` as a `Waker`, built once.
    waker: Waker,
}

impl<T, E> PendingEntry<T, E> {
    pub(crate) const fn id(&self) -> EntryId {
        self.id
    }

    /// Polls the computation with the entry's own waker.
    ///
    /// Returns `Poll::Ready` with the tagged outcome once it settles. Must not
    /// be polled again afterwards; the set removes it first.
    pub(crate) fn poll(&mut self) -> Poll<Settled<T, E>> {
        self.notify.clear_queued();
        let mut cx = Context::from_waker(&self.waker);
        self.future.as_mut().poll(&mut cx)
    }
}

impl<T, E> std::fmt::Debug for PendingEntry<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingEntry")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<T, E> std::fmt::Debug for Staged<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Staged")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
