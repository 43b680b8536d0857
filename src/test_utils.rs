//! Test helpers: logging setup, phase macros, and hand-settled computations.
//!
//! Compiled for unit tests and behind the `test-internals` feature so
//! integration tests can share them.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Once};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `raceset=trace`.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("raceset=trace"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

#[doc(hidden)]
pub fn log_phase(name: &str) {
    tracing::info!(test = name, "=== test phase ===");
}

#[doc(hidden)]
pub fn log_section(name: &str) {
    tracing::info!(section = name, "--- section ---");
}

#[doc(hidden)]
pub fn log_complete(name: &str, fields: &[(&str, String)]) {
    tracing::info!(test = name, ?fields, "=== test complete ===");
}

#[doc(hidden)]
pub fn log_assertion(message: &str, expected: &str, actual: &str, passed: bool) {
    if passed {
        tracing::debug!(check = message, expected, actual, "assertion passed");
    } else {
        tracing::error!(check = message, expected, actual, "assertion failed");
    }
}

/// Logs the start of a test.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        $crate::test_utils::log_phase($name)
    };
}

/// Logs a named section within a test.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        $crate::test_utils::log_section($name)
    };
}

/// Logs the end of a test, with optional `key = value` fields.
#[macro_export]
macro_rules! test_complete {
    ($name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::test_utils::log_complete(
            $name,
            &[$((stringify!($key), format!("{:?}", $value))),*],
        )
    };
}

/// Asserts a condition, logging expected and actual values either way.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr $(,)?) => {{
        let passed: bool = $cond;
        $crate::test_utils::log_assertion(
            $msg,
            &format!("{:?}", $expected),
            &format!("{:?}", $actual),
            passed,
        );
        assert!(
            passed,
            "{}: expected {:?}, actual {:?}",
            $msg, $expected, $actual
        );
    }};
}

/// Polls a future once with a no-op waker.
pub fn poll_once<F>(future: &mut F) -> Option<F::Output>
where
    F: Future + Unpin,
{
    let mut cx = Context::from_waker(Waker::noop());
    match Pin::new(future).poll(&mut cx) {
        Poll::Ready(output) => Some(output),
        Poll::Pending => None,
    }
}

struct ManualState<T> {
    value: Option<T>,
    waker: Option<Waker>,
}

/// A computation that settles when its [`Resolver`] says so.
pub struct ManualFuture<T> {
    state: Arc<Mutex<ManualState<T>>>,
}

/// Settles the paired [`ManualFuture`].
pub struct Resolver<T> {
    state: Arc<Mutex<ManualState<T>>>,
}

impl<T> ManualFuture<T> {
    /// Creates an unsettled future and its resolver.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new() -> (Self, Resolver<T>) {
        let state = Arc::new(Mutex::new(ManualState {
            value: None,
            waker: None,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            Resolver { state },
        )
    }
}

impl<T> Future for ManualFuture<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let mut state = self.state.lock();
        match state.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T> Resolver<T> {
    /// Settles the future with `value` and wakes whoever polled it last.
    pub fn resolve(self, value: T) {
        let waker = {
            let mut state = self.state.lock();
            state.value = Some(value);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Returns a computation that settles with `value` after `delay`, timed by a
/// helper thread.
pub fn settle_after<T>(delay: Duration, value: T) -> ManualFuture<T>
where
    T: Send + 'static,
{
    let (future, resolver) = ManualFuture::new();
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        resolver.resolve(value);
    });
    future
}
