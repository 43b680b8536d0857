//! E2E: RaceSet driven by a real executor with thread-timed computations.
//!
//! Covers completion ordering, failure propagation, the idle signal, drain
//! idempotence, and submission while a drain is suspended.

use futures_lite::future::block_on;
use raceset::test_utils::{ManualFuture, init_test_logging, settle_after};
use raceset::{RaceSet, SubmitError, assert_with_log, test_complete, test_phase, test_section};
use std::time::Duration;

/// Scale for timed tests; wide enough that thread wakeup jitter cannot reorder.
const UNIT: Duration = Duration::from_millis(20);

fn init_test(name: &str) {
    init_test_logging();
    test_phase!(name);
}

fn after(units: u32) -> Duration {
    UNIT * units
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    code: u16,
    reason: String,
}

// =========================================================================
// Completion order
// =========================================================================

#[test]
fn e2e_drains_in_completion_order() {
    init_test("e2e_drains_in_completion_order");
    let mut set: RaceSet<u32, Failure> = RaceSet::new();
    for (units, value) in [(1, 1u32), (3, 2), (2, 3)] {
        let fut = settle_after(after(units), Ok(value));
        set.submit(fut);
    }
    assert_eq!(set.remaining(), 3);

    let order = block_on(async {
        let mut order = Vec::new();
        while let Some(value) = set.next().await.expect("no failures") {
            order.push(value);
        }
        order
    });

    assert_with_log!(order == vec![1, 3, 2], "completion order", vec![1, 3, 2], order);
    assert_eq!(set.remaining(), 0);
    test_complete!("e2e_drains_in_completion_order", order = order);
}

#[test]
fn e2e_n_successes_then_idle() {
    init_test("e2e_n_successes_then_idle");
    let n = 12u32;
    let mut set: RaceSet<u32, Failure> = RaceSet::new();
    for i in 0..n {
        set.submit(settle_after(Duration::from_millis(u64::from(i % 4)), Ok(i)));
    }

    block_on(async {
        for drained in 1..=n {
            let value = set.next().await.expect("no failures");
            assert!(value.is_some());
            assert_eq!(set.remaining(), (n - drained) as usize);
        }
        assert_eq!(set.next().await, Ok(None));
    });
    test_complete!("e2e_n_successes_then_idle", n = n);
}

// =========================================================================
// Idle signal
// =========================================================================

#[test]
fn e2e_empty_set_returns_none_without_suspending() {
    init_test("e2e_empty_set_returns_none_without_suspending");
    let mut set: RaceSet<u8, Failure> = RaceSet::new();
    let first = raceset::test_utils::poll_once(&mut set.next());
    assert_with_log!(first == Some(Ok(None)), "ready on first poll", "Some(Ok(None))", first);
    test_complete!("e2e_empty_set_returns_none_without_suspending");
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn e2e_failure_payload_propagates_and_is_consumed() {
    init_test("e2e_failure_payload_propagates_and_is_consumed");
    let failure = Failure {
        code: 503,
        reason: "upstream unavailable".into(),
    };
    let mut set: RaceSet<u32, Failure> = RaceSet::new();
    set.submit(settle_after(after(1), Err(failure.clone())));
    set.submit(settle_after(after(3), Ok(9)));

    block_on(async {
        let observed = set.next().await;
        assert_with_log!(
            observed == Err(failure.clone()),
            "payload verbatim",
            failure,
            observed
        );
        assert_eq!(set.remaining(), 1);

        test_section!("set stays usable after a failure");
        assert_eq!(set.next().await, Ok(Some(9)));
        assert_eq!(set.next().await, Ok(None));
    });
    test_complete!("e2e_failure_payload_propagates_and_is_consumed");
}

#[test]
fn e2e_mixed_outcomes_either_submission_order() {
    init_test("e2e_mixed_outcomes_either_submission_order");
    for failing_first in [true, false] {
        let mut set: RaceSet<&'static str, Failure> = RaceSet::new();
        let ok = async { Ok("fine") };
        let bad = async {
            Err(Failure {
                code: 1,
                reason: "bad".into(),
            })
        };
        if failing_first {
            set.submit(bad);
            set.submit(ok);
        } else {
            set.submit(ok);
            set.submit(bad);
        }

        let (successes, failures) = block_on(async {
            let mut successes = Vec::new();
            let mut failures = Vec::new();
            for _ in 0..2 {
                match set.next().await {
                    Ok(Some(v)) => successes.push(v),
                    Ok(None) => panic!("set drained early"),
                    Err(e) => failures.push(e.code),
                }
            }
            (successes, failures)
        });
        assert_eq!(successes, vec!["fine"]);
        assert_eq!(failures, vec![1]);
        assert_eq!(set.remaining(), 0);
    }
    test_complete!("e2e_mixed_outcomes_either_submission_order");
}

// =========================================================================
// Identity and idempotence
// =========================================================================

#[test]
fn e2e_drained_outcomes_never_reappear() {
    init_test("e2e_drained_outcomes_never_reappear");
    let mut set: RaceSet<u8, Failure> = RaceSet::new();
    set.submit(async { Ok(1) });

    block_on(async {
        assert_eq!(set.next().await, Ok(Some(1)));
        for _ in 0..50 {
            assert_eq!(set.next().await, Ok(None));
            assert_eq!(set.remaining(), 0);
        }
    });
    test_complete!("e2e_drained_outcomes_never_reappear");
}

#[test]
fn e2e_equal_values_removed_independently() {
    init_test("e2e_equal_values_removed_independently");
    let mut set: RaceSet<&'static str, Failure> = RaceSet::new();
    let early = set.submit(settle_after(after(1), Ok("same")));
    let late = set.submit(settle_after(after(2), Ok("same")));

    block_on(async {
        let first = set.next_settled().await.expect("pending");
        assert_eq!(first.id(), early);
        assert!(set.contains(late));
        assert_eq!(set.remaining(), 1);

        let second = set.next_settled().await.expect("pending");
        assert_eq!(second.id(), late);
        assert_eq!(second.into_result(), Ok("same"));
    });
    assert!(set.is_empty());
    test_complete!("e2e_equal_values_removed_independently");
}

// =========================================================================
// Submission during a suspended drain
// =========================================================================

#[test]
fn e2e_late_submission_wins_running_race() {
    init_test("e2e_late_submission_wins_running_race");
    let mut set: RaceSet<&'static str, Failure> = RaceSet::new();
    let (stuck, resolver) = ManualFuture::new();
    set.submit(stuck);
    let submitter = set.submitter();

    let helper = std::thread::spawn(move || {
        std::thread::sleep(after(1));
        submitter.submit(async { Ok("late") }).expect("set alive");
        submitter
    });

    let winner = block_on(set.next());
    assert_with_log!(winner == Ok(Some("late")), "late entry wins", "late", winner);

    let submitter = helper.join().expect("helper panicked");
    resolver.resolve(Ok("stuck"));
    assert_eq!(block_on(set.next()), Ok(Some("stuck")));

    drop(set);
    assert_eq!(
        submitter.submit(async { Ok("orphan") }),
        Err(SubmitError::Closed)
    );
    test_complete!("e2e_late_submission_wins_running_race");
}
