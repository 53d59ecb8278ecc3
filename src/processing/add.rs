//! The `add` family: append existing columns, or compute a new column row by row.

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::frame::{validate_columns, DataFrame};
use crate::observability::{TransformContext, TransformKind, TransformStats};
use crate::path::ColumnPath;
use crate::row::AddDataRow;
use crate::types::Value;

use super::map::evaluate;
use super::AddOptions;

impl DataFrame {
    /// Append `columns` after the existing ones, in input order.
    ///
    /// Every column must have this table's row count (a table without columns and rows takes the
    /// length of the first appended column) and no two top-level columns may share a name.
    pub fn add_columns<I>(&self, columns: I) -> FrameResult<DataFrame>
    where
        I: IntoIterator<Item = Column>,
    {
        let mut all = self.columns().to_vec();
        all.extend(columns);
        let nrow = if self.column_count() == 0 && self.row_count() == 0 {
            all.first().map_or(0, Column::size)
        } else {
            self.row_count()
        };
        validate_columns(&all, nrow, &ColumnPath::root())?;
        Ok(DataFrame::from_validated(all, nrow))
    }

    /// Append every column of every table in `frames`.
    pub fn add_frames(&self, frames: &[DataFrame]) -> FrameResult<DataFrame> {
        self.add_columns(frames.iter().flat_map(|df| df.columns().iter().cloned()))
    }

    /// Append a column computed by evaluating `expression` on every row, in row order.
    ///
    /// ```rust
    /// use rust_dataframe::column::Column;
    /// use rust_dataframe::frame::DataFrame;
    /// use rust_dataframe::types::Value;
    ///
    /// let df = DataFrame::new(vec![
    ///     Column::create_with_type_inference("x", vec![Value::Int64(1), Value::Int64(2)], None)
    ///         .unwrap(),
    /// ])
    /// .unwrap();
    /// let out = df.add("y", |row| row.i64("x").map(|x| x * 10)).unwrap();
    /// assert_eq!(out.column_count(), 2);
    /// assert_eq!(df.column_count(), 1);
    /// ```
    pub fn add<V, F>(&self, name: &str, expression: F) -> FrameResult<DataFrame>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        self.add_with(name, &AddOptions::default(), expression)
    }

    /// Like [`DataFrame::add`], with explicit typing and an optional observer.
    pub fn add_with<V, F>(
        &self,
        name: &str,
        options: &AddOptions,
        expression: F,
    ) -> FrameResult<DataFrame>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        let ctx = TransformContext::new(TransformKind::Add, ColumnPath::of(name));
        let result = evaluate(self, name, options, &[], expression)
            .and_then(|column| self.add_columns([column]));
        options.report(&ctx, result, |out| transform_stats(self, out))
    }

    /// Compute a column and place it at `path`.
    ///
    /// A single-segment path is a plain [`DataFrame::add`]. A longer path inserts the column as a
    /// new field of the group addressed by all but the last segment; the expression still sees
    /// rows of this (top-level) table.
    pub fn add_at<V, F>(&self, path: impl Into<ColumnPath>, expression: F) -> FrameResult<DataFrame>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        self.add_at_with(path, &AddOptions::default(), expression)
    }

    pub fn add_at_with<V, F>(
        &self,
        path: impl Into<ColumnPath>,
        options: &AddOptions,
        expression: F,
    ) -> FrameResult<DataFrame>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        let path = path.into();
        let ctx = TransformContext::new(TransformKind::AddAt, path.clone());
        let result = match path.name() {
            None => Err(FrameError::path_not_found(ColumnPath::root())),
            Some(name) if path.len() == 1 => evaluate(self, name, options, &[], expression)
                .and_then(|column| self.add_columns([column])),
            Some(name) => evaluate(self, name, options, &[], expression)
                .and_then(|column| self.insert(&path, column)),
        };
        options.report(&ctx, result, |out| transform_stats(self, out))
    }
}

pub(crate) fn transform_stats(before: &DataFrame, after: &DataFrame) -> TransformStats {
    TransformStats {
        rows: after.row_count(),
        columns_before: before.column_count(),
        columns_after: after.column_count(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::column::Column;
    use crate::error::FrameError;
    use crate::frame::DataFrame;
    use crate::observability::{
        TransformContext, TransformKind, TransformObserver, TransformSeverity, TransformStats,
    };
    use crate::path::ColumnPath;
    use crate::processing::AddOptions;
    use crate::types::Value;

    fn col(name: &str, values: &[i64]) -> Column {
        Column::create_with_type_inference(
            name,
            values.iter().copied().map(Value::Int64).collect(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn add_columns_appends_in_order() {
        let df = DataFrame::new(vec![col("a", &[1, 2])]).unwrap();
        let out = df
            .add_columns(vec![col("c", &[0, 0]), col("b", &[0, 0])])
            .unwrap();
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["a", "c", "b"]);
        assert!(Column::ptr_eq(&out.columns()[0], &df.columns()[0]));
    }

    #[test]
    fn add_columns_rejects_length_mismatch_and_duplicates() {
        let df = DataFrame::new(vec![col("a", &[1, 2, 3])]).unwrap();
        let err = df.add_columns([col("b", &[1, 2])]).unwrap_err();
        assert_eq!(
            err,
            FrameError::LengthMismatch {
                column: "b".to_string(),
                expected: 3,
                actual: 2
            }
        );
        assert!(matches!(
            df.add_columns([col("a", &[1, 2, 3])]),
            Err(FrameError::DuplicateSiblingName { .. })
        ));
    }

    #[test]
    fn empty_table_adopts_first_length() {
        let out = DataFrame::empty().add_columns([col("a", &[1, 2])]).unwrap();
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn add_frames_appends_all_columns() {
        let df = DataFrame::new(vec![col("a", &[1])]).unwrap();
        let other = DataFrame::new(vec![col("b", &[2]), col("c", &[3])]).unwrap();
        let out = df.add_frames(&[other]).unwrap();
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn add_at_single_segment_appends() {
        let df = DataFrame::new(vec![col("a", &[1, 2])]).unwrap();
        let out = df.add_at("b", |row| row.i64("a")).unwrap();
        assert_eq!(out.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(
            df.add_at(ColumnPath::root(), |_| 1_i64),
            Err(FrameError::PathNotFound { .. })
        ));
    }

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<(TransformKind, Option<TransformSeverity>, Option<TransformStats>)>>,
    }

    impl TransformObserver for Recording {
        fn on_success(&self, ctx: &TransformContext, stats: TransformStats) {
            self.events
                .lock()
                .unwrap()
                .push((ctx.operation, None, Some(stats)));
        }

        fn on_failure(&self, ctx: &TransformContext, severity: TransformSeverity, _error: &FrameError) {
            self.events
                .lock()
                .unwrap()
                .push((ctx.operation, Some(severity), None));
        }
    }

    #[test]
    fn add_with_reports_outcome() {
        let df = DataFrame::new(vec![col("a", &[1, 2])]).unwrap();
        let obs = Arc::new(Recording::default());
        let options = AddOptions {
            observer: Some(obs.clone()),
            ..Default::default()
        };

        df.add_with("b", &options, |row| row.i64("a")).unwrap();
        df.add_with("a", &options, |row| row.i64("a")).unwrap_err();

        let events = obs.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            (
                TransformKind::Add,
                None,
                Some(TransformStats {
                    rows: 2,
                    columns_before: 1,
                    columns_after: 2
                })
            )
        );
        assert_eq!(events[1], (TransformKind::Add, Some(TransformSeverity::Error), None));
    }
}
