//! Row views used by row expressions.

use std::ops::Deref;

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::frame::DataFrame;
use crate::path::ColumnPath;
use crate::types::Value;

/// A borrowed view of one row of a [`DataFrame`].
#[derive(Debug, Clone, Copy)]
pub struct DataRow<'a> {
    frame: &'a DataFrame,
    index: usize,
}

impl<'a> DataRow<'a> {
    pub(crate) fn new(frame: &'a DataFrame, index: usize) -> Self {
        Self { frame, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The table this row belongs to.
    pub fn frame(&self) -> &'a DataFrame {
        self.frame
    }

    /// Cell of the top-level column `name`. Group cells are single-row tables.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.frame.column(name)?.get(self.index)
    }

    /// Cell of the (possibly nested) column at `path`.
    pub fn get_path(&self, path: &ColumnPath) -> Option<Value> {
        self.frame.resolve(path)?.column.get(self.index)
    }

    /// Like [`DataRow::get_path`], reporting [`FrameError::PathNotFound`] for unknown columns.
    pub fn value(&self, path: impl Into<ColumnPath>) -> FrameResult<Value> {
        let path = path.into();
        self.get_path(&path).ok_or(FrameError::PathNotFound { path })
    }

    /// Shortcut for integer cells.
    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    /// Shortcut for numeric cells.
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_f64()
    }

    pub fn prev(&self) -> Option<DataRow<'a>> {
        let index = self.index.checked_sub(1)?;
        self.frame.row(index)
    }

    pub fn next(&self) -> Option<DataRow<'a>> {
        self.frame.row(self.index + 1)
    }

    /// All top-level cells of this row, in column order.
    pub fn values(&self) -> Vec<Value> {
        self.frame
            .columns()
            .iter()
            .filter_map(|c| c.get(self.index))
            .collect()
    }
}

/// Row view handed to `add` expressions.
///
/// Besides the input row it exposes two side channels, both populated by the evaluator and
/// passed in explicitly:
///
/// - the values already computed for the column being built (rows before this one)
/// - the columns accumulated earlier in the same batch add, read at this row
#[derive(Debug, Clone, Copy)]
pub struct AddDataRow<'a> {
    row: DataRow<'a>,
    computed: &'a [Value],
    pending: &'a [Column],
}

impl<'a> AddDataRow<'a> {
    pub(crate) fn new(row: DataRow<'a>, computed: &'a [Value], pending: &'a [Column]) -> Self {
        Self {
            row,
            computed,
            pending,
        }
    }

    pub fn row(&self) -> DataRow<'a> {
        self.row
    }

    /// Value already computed for the new column at `index`.
    ///
    /// Only rows evaluated before this one are available.
    pub fn new_at(&self, index: usize) -> Option<&'a Value> {
        self.computed.get(index)
    }

    /// Value computed for the new column at the previous row.
    pub fn prev_new(&self) -> Option<&'a Value> {
        let index = self.row.index().checked_sub(1)?;
        self.new_at(index)
    }

    /// Cell at this row of a column added earlier in the same batch add.
    pub fn pending(&self, name: &str) -> Option<Value> {
        self.pending
            .iter()
            .find(|c| c.name() == name)?
            .get(self.row.index())
    }
}

impl<'a> Deref for AddDataRow<'a> {
    type Target = DataRow<'a>;

    fn deref(&self) -> &Self::Target {
        &self.row
    }
}

#[cfg(test)]
mod tests {
    use super::AddDataRow;
    use crate::column::Column;
    use crate::frame::DataFrame;
    use crate::path::ColumnPath;
    use crate::types::Value;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Column::create_with_type_inference(
                "a",
                vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)],
                None,
            )
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn row_navigation() {
        let df = sample();
        let row = df.row(1).unwrap();
        assert_eq!(row.i64("a"), Some(2));
        assert_eq!(row.prev().and_then(|r| r.i64("a")), Some(1));
        assert_eq!(row.next().and_then(|r| r.i64("a")), Some(3));
        assert!(df.row(0).unwrap().prev().is_none());
        assert!(df.row(2).unwrap().next().is_none());
        assert!(df.row(3).is_none());
    }

    #[test]
    fn value_reports_missing_path() {
        let df = sample();
        let row = df.row(0).unwrap();
        assert!(row.value("a").is_ok());
        assert!(row.value(ColumnPath::new(["a", "b"])).is_err());
    }

    #[test]
    fn add_row_exposes_computed_and_pending() {
        let df = sample();
        let computed = vec![Value::Int64(10)];
        let pending = vec![
            Column::create_with_type_inference(
                "p",
                vec![Value::from("x"), Value::from("y"), Value::from("z")],
                None,
            )
            .unwrap(),
        ];
        let row = AddDataRow::new(df.row(1).unwrap(), &computed, &pending);
        assert_eq!(row.prev_new(), Some(&Value::Int64(10)));
        assert_eq!(row.new_at(1), None);
        assert_eq!(row.pending("p"), Some(Value::from("y")));
        assert_eq!(row.pending("q"), None);
        assert_eq!(row.i64("a"), Some(2));
    }
}
