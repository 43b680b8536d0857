//! Identity tokens for pending computations.
//!
//! Every computation submitted to a [`RaceSet`](crate::RaceSet) is tagged with
//! an [`EntryId`]. Ids come from a per-set counter and are never reused by that
//! set, so two computations that produce equal values are still told apart
//! when one of them settles.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identity of one submitted computation.
///
/// Ids are strictly increasing in submission order within one set. They carry
/// no meaning across different sets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates an entry ID for testing purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntryId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

impl fmt::Display for EntryId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Mints [`EntryId`]s for one set and every submitter handle cloned from it.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub(crate) const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Returns a fresh id. Relaxed is enough: uniqueness only needs the RMW.
    pub(crate) fn mint(&self) -> EntryId {
        EntryId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn ids_are_strictly_increasing() {
        init_test("ids_are_strictly_increasing");
        let ids = IdAllocator::new();
        let a = ids.mint();
        let b = ids.mint();
        let c = ids.mint();
        crate::assert_with_log!(a < b && b < c, "ids increase", true, a < b && b < c);
        crate::test_complete!("ids_are_strictly_increasing");
    }

    #[test]
    fn ids_unique_across_threads() {
        init_test("ids_unique_across_threads");
        let ids = Arc::new(IdAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.mint()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("minting thread panicked") {
                assert!(seen.insert(id), "duplicate id {id:?}");
            }
        }
        crate::assert_with_log!(seen.len() == 1000, "all ids distinct", 1000, seen.len());
        crate::test_complete!("ids_unique_across_threads");
    }

    #[test]
    fn display_and_debug() {
        init_test("display_and_debug");
        let id = EntryId::new_for_test(7);
        assert_eq!(format!("{id}"), "E7");
        assert_eq!(format!("{id:?}"), "EntryId(7)");
        assert_eq!(id.as_u64(), 7);
        crate::test_complete!("display_and_debug");
    }
}
