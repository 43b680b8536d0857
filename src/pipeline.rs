//! Bounded-concurrency pipelines over a [`RaceSet`].
//!
//! The set itself never throttles; these helpers run the usual loop around it:
//! submit while below the limit, drain one outcome, repeat.
//!
//! ```
//! use futures_lite::future::block_on;
//! use raceset::pipeline::{BoundedConfig, collect_bounded};
//!
//! let work = (1..=5u32).map(|i| async move { Ok::<_, String>(i * 10) });
//! let mut values = block_on(collect_bounded(work, BoundedConfig::new(2))).unwrap();
//! values.sort_unstable();
//! assert_eq!(values, vec![10, 20, 30, 40, 50]);
//! ```

use crate::outcome::Settled;
use crate::set::RaceSet;
use crate::tracing_compat::debug;
use std::future::Future;

/// Settings for [`for_each_bounded`] and [`collect_bounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedConfig {
    limit: usize,
    fail_fast: bool,
}

impl BoundedConfig {
    /// Default ceiling on in-flight computations.
    pub const DEFAULT_LIMIT: usize = 16;

    /// Creates a config with the given in-flight ceiling and fail-fast on.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        assert!(limit > 0, "bounded limit must be non-zero");
        Self {
            limit,
            fail_fast: true,
        }
    }

    /// Sets the in-flight ceiling.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        assert!(limit > 0, "bounded limit must be non-zero");
        self.limit = limit;
        self
    }

    /// Whether the first failure stops the pipeline.
    ///
    /// When on, the first failure stops new submissions, drops in-flight work,
    /// and is returned. When off, all work runs and the first failure observed
    /// is returned at the end.
    #[must_use]
    pub const fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Returns the in-flight ceiling.
    #[must_use]
    pub const fn max_in_flight(&self) -> usize {
        self.limit
    }

    /// Returns true if the first failure stops the pipeline.
    #[must_use]
    pub const fn is_fail_fast(&self) -> bool {
        self.fail_fast
    }
}

impl Default for BoundedConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

/// Runs `work` with at most `config.max_in_flight()` computations in flight,
/// handing every outcome to `on_settled` in completion order.
///
/// # Errors
///
/// Returns the first failure observed, per [`BoundedConfig::fail_fast`].
/// Failures are also passed to `on_settled` before being returned.
pub async fn for_each_bounded<I, F, T, E, C>(
    work: I,
    config: BoundedConfig,
    mut on_settled: C,
) -> Result<(), E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: 'static,
    E: Clone + 'static,
    C: FnMut(Settled<T, E>),
{
    let mut work = work.into_iter();
    let mut set = RaceSet::with_capacity(config.limit);
    let mut first_failure: Option<E> = None;
    let mut exhausted = false;

    loop {
        while !exhausted && set.remaining() < config.limit {
            match work.next() {
                Some(computation) => {
                    set.submit(computation);
                }
                None => exhausted = true,
            }
        }

        let Some(settled) = set.next_settled().await else {
            break;
        };

        if let Err(err) = settled.result() {
            if config.fail_fast {
                let err = err.clone();
                debug!(
                    id = %settled.id(),
                    dropped = set.remaining(),
                    "pipeline failed fast"
                );
                on_settled(settled);
                return Err(err);
            }
            if first_failure.is_none() {
                first_failure = Some(err.clone());
            }
        }
        on_settled(settled);
    }

    first_failure.map_or(Ok(()), Err)
}

/// Runs `work` with bounded concurrency and collects success values in
/// completion order.
///
/// # Errors
///
/// Returns the first failure observed, per [`BoundedConfig::fail_fast`].
pub async fn collect_bounded<I, F, T, E>(work: I, config: BoundedConfig) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: 'static,
    E: Clone + 'static,
{
    let mut values = Vec::new();
    for_each_bounded(work, config, |settled| {
        if let Ok(value) = settled.into_result() {
            values.push(value);
        }
    })
    .await?;
    Ok(values)
}
