use std::sync::{Arc, Mutex};

use rust_dataframe::column::Column;
use rust_dataframe::frame::DataFrame;
use rust_dataframe::inference::Infer;
use rust_dataframe::observability::{
    CompositeObserver, FileObserver, TransformContext, TransformKind, TransformObserver,
    TransformSeverity, TransformStats,
};
use rust_dataframe::path::ColumnPath;
use rust_dataframe::processing::AddOptions;
use rust_dataframe::types::{BaseType, DataType, Value};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(TransformKind, TransformStats)>>,
    failures: Mutex<Vec<TransformSeverity>>,
    alerts: Mutex<Vec<TransformSeverity>>,
}

impl TransformObserver for RecordingObserver {
    fn on_success(&self, ctx: &TransformContext, stats: TransformStats) {
        self.successes.lock().unwrap().push((ctx.operation, stats));
    }

    fn on_failure(
        &self,
        _ctx: &TransformContext,
        severity: TransformSeverity,
        _error: &rust_dataframe::FrameError,
    ) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(
        &self,
        _ctx: &TransformContext,
        severity: TransformSeverity,
        _error: &rust_dataframe::FrameError,
    ) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn sample() -> DataFrame {
    DataFrame::new(vec![Column::create_with_type_inference(
        "n",
        vec![Value::Int64(1), Value::Int64(2)],
        None,
    )
    .unwrap()])
    .unwrap()
}

#[test]
fn observer_receives_failure_and_alert_on_type_mismatch() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = AddOptions {
        infer: Infer::None,
        data_type: Some(DataType::of(BaseType::Int64)),
        observer: Some(obs.clone()),
        alert_at_or_above: TransformSeverity::Critical,
    };

    // A null under a non-nullable declared type -> TypeMismatch -> Critical
    let _ = sample()
        .add_with("half", &opts, |row| row.i64("n").filter(|n| n % 2 == 0))
        .unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![TransformSeverity::Critical]);
    assert_eq!(alerts, vec![TransformSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = AddOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: TransformSeverity::Critical,
        ..Default::default()
    };

    // Unknown group -> PathNotFound -> Error severity (not Critical) -> no alert
    let _ = sample()
        .add_at_with(ColumnPath::new(["missing", "x"]), &opts, |_| 0_i64)
        .unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![TransformSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn batch_and_group_adds_report_once() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = AddOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let df = sample();
    df.add_batch_with(&opts, |dsl| {
        dsl.bind_expression("a", |_| 1_i64)?;
        dsl.bind_expression("b", |_| 2_i64)?;
        Ok(())
    })
    .unwrap();

    let grouped = df.group_by(&["n"]).unwrap();
    grouped.add_with("m", &opts, |row| row.i64("n")).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![
            (
                TransformKind::AddBatch,
                TransformStats {
                    rows: 2,
                    columns_before: 1,
                    columns_after: 3
                }
            ),
            (
                TransformKind::GroupAdd,
                TransformStats {
                    rows: 2,
                    columns_before: 1,
                    columns_after: 2
                }
            ),
        ]
    );
}

#[test]
fn file_observer_appends_lines() {
    let path = std::env::temp_dir().join(format!(
        "rust_dataframe_observer_{}.log",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let file: Arc<dyn TransformObserver> = Arc::new(FileObserver::new(&path));
    let opts = AddOptions {
        observer: Some(Arc::new(CompositeObserver::new(vec![file]))),
        ..Default::default()
    };
    sample().add_with("m", &opts, |row| row.i64("n")).unwrap();
    sample().add_with("n", &opts, |row| row.i64("n")).unwrap_err();

    let log = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("ok op=Add target=m rows=2 columns=1->2"));
    assert!(lines[1].contains("fail severity=Error op=Add target=n"));
    let _ = std::fs::remove_file(&path);
}
