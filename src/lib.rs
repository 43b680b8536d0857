//! Raceset: a completion-order multiplexer for async computations.
//!
//! # Overview
//!
//! A [`RaceSet`] holds a growable set of independently running computations
//! and hands their outcomes back one at a time, in the order they actually
//! finish rather than the order they were submitted. It is the building block
//! for bounded-concurrency pipelines: submit while below a ceiling, drain one
//! result, repeat.
//!
//! # Core Guarantees
//!
//! - **Completion order**: each drain reports the computation that settled,
//!   never one that is still running
//! - **Exactly once**: a settled computation is reported by exactly one drain
//!   and then forgotten
//! - **Verbatim failures**: a computation's error payload is returned as-is
//! - **Idle signal**: draining an empty set resolves immediately with `None`
//! - **Runtime-agnostic**: any executor that polls futures can drive a set
//!
//! # Module Structure
//!
//! - [`set`]: The multiplexer and its drain futures
//! - [`submitter`]: Cross-task submission handle
//! - [`id`]: Identity tokens for submitted computations
//! - [`outcome`]: Tagged outcomes
//! - [`pipeline`]: Bounded-concurrency helpers built on the set
//! - [`error`](mod@error): Error types

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

mod entry;
pub mod error;
pub mod id;
pub mod outcome;
pub mod pipeline;
pub mod set;
pub mod submitter;
mod tracing_compat;
mod wake;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use error::SubmitError;
pub use id::EntryId;
pub use outcome::Settled;
pub use pipeline::{BoundedConfig, collect_bounded, for_each_bounded};
pub use set::{Next, NextSettled, RaceSet};
pub use submitter::Submitter;
