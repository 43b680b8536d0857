//! Readiness plumbing between pending entries and the task driving the set.
//!
//! Each entry owns an [`EntryWaker`]. Waking it pushes the entry's id onto the
//! shared ready queue and wakes whichever task last polled the set. The set
//! then polls only the entries named in the queue.

use crate::entry::Staged;
use crate::id::{EntryId, IdAllocator};
use crossbeam_queue::SegQueue;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering, fence};
use std::task::{Wake, Waker};

/// State shared by a set, its entry wakers, and its submitters.
pub(crate) struct Shared<T, E> {
    /// Ids of entries that asked to be polled. May hold stale ids.
    pub(crate) ready: SegQueue<EntryId>,
    /// Computations handed in by submitters, not yet in the slab.
    pub(crate) staged: SegQueue<Staged<T, E>>,
    /// Count of staged computations, bumped before the push.
    pub(crate) staged_len: AtomicUsize,
    /// Waker of the task currently driving the set.
    parent: Mutex<Option<Waker>>,
    pub(crate) ids: IdAllocator,
    closed: AtomicBool,
}

impl<T, E> Shared<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            ready: SegQueue::new(),
            staged: SegQueue::new(),
            staged_len: AtomicUsize::new(0),
            parent: Mutex::new(None),
            ids: IdAllocator::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Stores the driving task's waker, skipping the clone when unchanged.
    pub(crate) fn register(&self, waker: &Waker) {
        let mut parent = self.parent.lock();
        match parent.as_ref() {
            Some(current) if current.will_wake(waker) => {}
            _ => *parent = Some(waker.clone()),
        }
    }

    pub(crate) fn wake_parent(&self) {
        // Clone out so the lock is not held across a foreign wake.
        let waker = self.parent.lock().clone();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Marks the set as gone and drops whatever submitters had staged.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // Pairs with the fence in `Submitter::submit`: a push racing this
        // close is either drained below or sees `closed` and drains itself.
        fence(Ordering::SeqCst);
        self.discard_staged();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Drops staged computations that no set will absorb. Returns how many.
    pub(crate) fn discard_staged(&self) -> usize {
        let mut discarded = 0;
        while self.staged.pop().is_some() {
            self.staged_len.fetch_sub(1, Ordering::AcqRel);
            discarded += 1;
        }
        discarded
    }

    pub(crate) fn staged_len(&self) -> usize {
        self.staged_len.load(Ordering::Acquire)
    }
}

/// Per-entry waker feeding the ready queue.
pub(crate) struct EntryWaker<T, E> {
    id: EntryId,
    /// Set while the id sits in the ready queue; dedups bursts of wakes.
    queued: AtomicBool,
    shared: Arc<Shared<T, E>>,
}

impl<T, E> EntryWaker<T, E> {
    /// Creates the waker and queues the entry for its first poll.
    pub(crate) fn new_queued(id: EntryId, shared: Arc<Shared<T, E>>) -> Arc<Self> {
        shared.ready.push(id);
        Arc::new(Self {
            id,
            queued: AtomicBool::new(true),
            shared,
        })
    }

    /// Clears the queued flag; called right before the entry is polled so a
    /// wake during the poll queues it again.
    pub(crate) fn clear_queued(&self) {
        self.queued.store(false, Ordering::Release);
    }

    fn enqueue(&self) {
        if !self.queued.swap(true, Ordering::AcqRel) {
            self.shared.ready.push(self.id);
            self.shared.wake_parent();
        }
    }
}

impl<T, E> Wake for EntryWaker<T, E>
where
    T: 'static,
    E: 'static,
{
    fn wake(self: Arc<Self>) {
        self.enqueue();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.enqueue();
    }
}
