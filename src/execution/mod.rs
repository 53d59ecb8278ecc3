//! Execution engine for group-scoped transformations with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel execution of per-group transformations over a [`GroupBy`]
//! - Resource limits / throttling (in-flight groups)
//! - Real-time metrics + observer hooks for monitoring
//!
//! Rows inside one group are still evaluated sequentially and in order; only distinct groups
//! run concurrently. Results are reassembled in group order.

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::FrameResult;
use crate::frame::DataFrame;
use crate::observability::{TransformContext, TransformKind};
use crate::processing::map::evaluate_values;
use crate::processing::{AddOptions, GroupBy};
use crate::row::AddDataRow;
use crate::types::Value;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on concurrently executing groups.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_groups: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            max_in_flight_groups: n.max(1),
        }
    }
}

/// A configurable execution engine for grouped [`DataFrame`] transformations.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

type GroupFn<'a, T> = dyn Fn(&DataFrame) -> FrameResult<T> + Send + Sync + 'a;

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `max_in_flight_groups == 0`, `num_threads == Some(0)`, or the thread pool
    /// cannot be built.
    pub fn new(opts: ExecutionOptions) -> Self {
        assert!(
            opts.max_in_flight_groups > 0,
            "max_in_flight_groups must be > 0"
        );
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Transform every group of `groups` on the engine's pool.
    ///
    /// Fails as a whole if any group fails; the error reported is the one of the first failing
    /// group in group order.
    pub fn update_groups<F>(&self, groups: &GroupBy, f: F) -> FrameResult<GroupBy>
    where
        F: Fn(&DataFrame) -> FrameResult<DataFrame> + Send + Sync,
    {
        let frames = self.pool.install(|| self.run_groups(groups, &f, DataFrame::row_count))?;
        Ok(groups.with_groups(frames))
    }

    /// Parallel counterpart of [`GroupBy::add_with`]: one computed column per group, groups
    /// evaluated concurrently. The column type is settled once over all groups, exactly as in
    /// the sequential add.
    pub fn add_to_groups<V, F>(
        &self,
        groups: &GroupBy,
        name: &str,
        options: &AddOptions,
        expression: F,
    ) -> FrameResult<GroupBy>
    where
        V: Into<Value>,
        F: Fn(&AddDataRow<'_>) -> V + Send + Sync,
    {
        let ctx = TransformContext::new(TransformKind::GroupAdd, groups.target(name));
        let evaluate = |g: &DataFrame| -> FrameResult<Vec<Value>> {
            Ok(evaluate_values(g, &[], &expression))
        };
        let result = self
            .pool
            .install(|| self.run_groups(groups, &evaluate, Vec::<Value>::len))
            .and_then(|parts| groups.attach_computed(name, options, parts));
        options.report(&ctx, result, |out| groups.stats(out))
    }

    fn run_groups<T: Send>(
        &self,
        groups: &GroupBy,
        f: &GroupFn<'_, T>,
        output_rows: fn(&T) -> usize,
    ) -> FrameResult<Vec<T>> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            groups: groups.group_count(),
        });

        let sem = Semaphore::new(self.opts.max_in_flight_groups);
        let results: Vec<FrameResult<T>> = groups
            .groups()
            .frames()
            .par_iter()
            .enumerate()
            .map(|(index, frame)| {
                let (_permit, waited) = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_group_start();
                self.emit(ExecutionEvent::GroupStarted {
                    index,
                    row_count: frame.row_count(),
                });

                let out = f(frame);
                self.metrics.on_rows_processed(frame.row_count());
                match &out {
                    Ok(v) => self.emit(ExecutionEvent::GroupFinished {
                        index,
                        output_rows: output_rows(v),
                    }),
                    Err(e) => self.emit(ExecutionEvent::GroupFailed {
                        index,
                        error: e.to_string(),
                    }),
                }
                self.metrics.on_group_end(out.is_ok());
                out
            })
            .collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        results.into_iter().collect()
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
