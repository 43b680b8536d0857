//! Optional `tracing` integration.
//!
//! With the `tracing-integration` feature the macros here are `tracing`'s own.
//! Without it they expand to nothing, so log statements cost nothing and the
//! `tracing` crate is not linked.

#[cfg(feature = "tracing-integration")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing-integration"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing-integration"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing-integration"))]
pub(crate) use debug;
#[cfg(not(feature = "tracing-integration"))]
pub(crate) use trace;
