//! Transformation outcome reporting.
//!
//! Transformations that take [`crate::processing::AddOptions`] report their outcome to an
//! optional [`TransformObserver`]: `on_success` with row/column stats, `on_failure` with a
//! severity, and `on_alert` when the severity meets `alert_at_or_above`.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::FrameError;
use crate::path::ColumnPath;

/// How bad a failed transformation is. Ordered, so it can be compared to a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransformSeverity {
    Info,
    Warning,
    /// The call failed; the input table is untouched.
    Error,
    /// Types or schemas disagree.
    Critical,
}

/// Which transformation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Add,
    AddAt,
    AddBatch,
    GroupAdd,
}

#[derive(Debug, Clone)]
pub struct TransformContext {
    pub operation: TransformKind,
    /// Column being produced; the root path for batch adds.
    pub target: ColumnPath,
}

impl TransformContext {
    pub fn new(operation: TransformKind, target: ColumnPath) -> Self {
        Self { operation, target }
    }
}

impl fmt::Display for TransformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op={:?} target={}", self.operation, self.target)
    }
}

/// Table shape reported on success. Column counts are top-level only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformStats {
    pub rows: usize,
    pub columns_before: usize,
    pub columns_after: usize,
}

/// Receives transformation outcomes. Every callback has a no-op default.
pub trait TransformObserver: Send + Sync {
    fn on_success(&self, _ctx: &TransformContext, _stats: TransformStats) {}

    fn on_failure(&self, _ctx: &TransformContext, _severity: TransformSeverity, _error: &FrameError) {
    }

    /// Called after `on_failure` when the severity meets the caller's threshold.
    /// Defaults to `on_failure` again.
    fn on_alert(&self, ctx: &TransformContext, severity: TransformSeverity, error: &FrameError) {
        self.on_failure(ctx, severity, error)
    }
}

/// One reported outcome, rendered as a single log line body.
enum Outcome<'a> {
    Ok(TransformStats),
    Failed(TransformSeverity, &'a FrameError),
    Alert(TransformSeverity, &'a FrameError),
}

struct Line<'a>(&'a TransformContext, Outcome<'a>);

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Line(ctx, outcome) = self;
        match outcome {
            Outcome::Ok(s) => write!(
                f,
                "ok {ctx} rows={} columns={}->{}",
                s.rows, s.columns_before, s.columns_after
            ),
            Outcome::Failed(sev, e) => write!(f, "fail severity={sev:?} {ctx} err={e}"),
            Outcome::Alert(sev, e) => write!(f, "ALERT severity={sev:?} {ctx} err={e}"),
        }
    }
}

/// Forwards every callback to each inner observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn TransformObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn TransformObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl TransformObserver for CompositeObserver {
    fn on_success(&self, ctx: &TransformContext, stats: TransformStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &TransformContext, severity: TransformSeverity, error: &FrameError) {
        self.observers
            .iter()
            .for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &TransformContext, severity: TransformSeverity, error: &FrameError) {
        self.observers
            .iter()
            .for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Prints one `[transform]` line per outcome to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl TransformObserver for StdErrObserver {
    fn on_success(&self, ctx: &TransformContext, stats: TransformStats) {
        eprintln!("[transform] {}", Line(ctx, Outcome::Ok(stats)));
    }

    fn on_failure(&self, ctx: &TransformContext, severity: TransformSeverity, error: &FrameError) {
        eprintln!("[transform] {}", Line(ctx, Outcome::Failed(severity, error)));
    }

    fn on_alert(&self, ctx: &TransformContext, severity: TransformSeverity, error: &FrameError) {
        eprintln!("[transform] {}", Line(ctx, Outcome::Alert(severity, error)));
    }
}

/// Appends `<unix seconds> <outcome>` lines to a log file.
///
/// The file is opened per line. I/O errors go to stderr and never fail a transformation.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, line: Line<'_>) {
        let _guard = self.lock.lock();
        if let Err(e) = self.try_append(&line) {
            eprintln!("[transform] could not append to {}: {e}", self.path.display());
        }
    }

    fn try_append(&self, line: &Line<'_>) -> io::Result<()> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{secs} {line}")
    }
}

impl TransformObserver for FileObserver {
    fn on_success(&self, ctx: &TransformContext, stats: TransformStats) {
        self.append(Line(ctx, Outcome::Ok(stats)));
    }

    fn on_failure(&self, ctx: &TransformContext, severity: TransformSeverity, error: &FrameError) {
        self.append(Line(ctx, Outcome::Failed(severity, error)));
    }

    fn on_alert(&self, ctx: &TransformContext, severity: TransformSeverity, error: &FrameError) {
        self.append(Line(ctx, Outcome::Alert(severity, error)));
    }
}
