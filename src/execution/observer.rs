use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Execution events emitted by the engine, in the order a group goes through them.
///
/// Group events carry the group's position in the [`crate::processing::GroupBy`], not the order
/// in which groups happen to run.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { groups: usize },
    /// A group waited this long for an in-flight slot.
    ThrottleWaited { duration: Duration },
    GroupStarted { index: usize, row_count: usize },
    GroupFinished { index: usize, output_rows: usize },
    GroupFailed { index: usize, error: String },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionEvent::RunStarted { groups } => write!(f, "run started groups={groups}"),
            ExecutionEvent::ThrottleWaited { duration } => write!(f, "throttled for {duration:?}"),
            ExecutionEvent::GroupStarted { index, row_count } => {
                write!(f, "group #{index} started rows={row_count}")
            }
            ExecutionEvent::GroupFinished { index, output_rows } => {
                write!(f, "group #{index} finished rows={output_rows}")
            }
            ExecutionEvent::GroupFailed { index, error } => {
                write!(f, "group #{index} failed: {error}")
            }
            ExecutionEvent::RunFinished { elapsed, metrics } => {
                write!(f, "run finished in {elapsed:?}: {metrics}")
            }
        }
    }
}

/// Observer hook for execution events.
///
/// Called from worker threads, possibly concurrently.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Writes one `[execution]` line per event to stderr.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("[execution] {event}");
    }
}

/// Live counters of the current (or last) run.
///
/// The engine resets them when a run starts; callers may [`snapshot`](Self::snapshot) at any
/// time, including while groups are still running.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    runs: AtomicU64,
    elapsed_ns: AtomicU64,
    rows_processed: AtomicU64,
    groups: GroupCounters,
    throttle_wait_ns: AtomicU64,
}

#[derive(Debug, Default)]
struct GroupCounters {
    started: AtomicU64,
    finished: AtomicU64,
    failed: AtomicU64,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_run(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        for counter in [
            &self.elapsed_ns,
            &self.rows_processed,
            &self.throttle_wait_ns,
            &self.groups.started,
            &self.groups.finished,
            &self.groups.failed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.groups.active.store(0, Ordering::Relaxed);
        self.groups.max_active.store(0, Ordering::Relaxed);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(nanos(elapsed), Ordering::Relaxed);
    }

    pub fn on_rows_processed(&self, rows: usize) {
        self.rows_processed.fetch_add(rows as u64, Ordering::Relaxed);
    }

    pub fn on_group_start(&self) {
        self.groups.started.fetch_add(1, Ordering::Relaxed);
        let now = self.groups.active.fetch_add(1, Ordering::AcqRel) + 1;
        self.groups.max_active.fetch_max(now, Ordering::AcqRel);
    }

    pub fn on_group_end(&self, ok: bool) {
        let outcome = if ok {
            &self.groups.finished
        } else {
            &self.groups.failed
        };
        outcome.fetch_add(1, Ordering::Relaxed);
        self.groups.active.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn on_throttle_wait(&self, d: Duration) {
        self.throttle_wait_ns.fetch_add(nanos(d), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::Relaxed);
        ExecutionMetricsSnapshot {
            run_id: self.runs.load(Ordering::Relaxed),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            rows_processed: self.rows_processed.load(Ordering::Relaxed),
            groups_started: self.groups.started.load(Ordering::Relaxed),
            groups_finished: self.groups.finished.load(Ordering::Relaxed),
            groups_failed: self.groups.failed.load(Ordering::Relaxed),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::Relaxed)),
            max_active_groups: self.groups.max_active.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ExecutionMetrics`]. `run_id` counts runs since the engine was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    /// `None` until the run has finished.
    pub elapsed: Option<Duration>,
    pub rows_processed: u64,
    pub groups_started: u64,
    pub groups_finished: u64,
    pub groups_failed: u64,
    pub throttle_wait: Duration,
    pub max_active_groups: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run #{} groups={}/{} (failed={}) rows={} peak_in_flight={} throttled={:?}",
            self.run_id,
            self.groups_finished,
            self.groups_started,
            self.groups_failed,
            self.rows_processed,
            self.max_active_groups,
            self.throttle_wait,
        )?;
        if let Some(elapsed) = self.elapsed {
            write!(f, " elapsed={elapsed:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ExecutionEvent, ExecutionMetrics};

    #[test]
    fn counters_reset_per_run() {
        let m = ExecutionMetrics::new();
        m.begin_run();
        m.on_group_start();
        m.on_group_start();
        m.on_rows_processed(3);
        m.on_group_end(true);
        m.on_group_end(false);
        m.end_run(Duration::from_millis(1));

        let first = m.snapshot();
        assert_eq!(first.run_id, 1);
        assert_eq!((first.groups_finished, first.groups_failed), (1, 1));
        assert_eq!(first.max_active_groups, 2);
        assert!(first.to_string().starts_with("run #1 groups=1/2 (failed=1) rows=3"));

        m.begin_run();
        let second = m.snapshot();
        assert_eq!(second.run_id, 2);
        assert_eq!(second.rows_processed, 0);
        assert_eq!(second.elapsed, None);
    }

    #[test]
    fn events_render_as_log_lines() {
        let e = ExecutionEvent::GroupFailed {
            index: 4,
            error: "boom".to_string(),
        };
        assert_eq!(e.to_string(), "group #4 failed: boom");
    }
}
