//! Columns: the atomic typed unit of a [`DataFrame`].
//!
//! A [`Column`] is one of three kinds:
//!
//! - [`ValueColumn`]: scalar values with a declared [`DataType`]
//! - [`ColumnGroup`]: a nested record per row, backed by one embedded table
//! - [`FrameColumn`]: an independent embedded table per row
//!
//! Columns are immutable. Every heavy payload sits behind an `Arc`, so cloning, renaming and
//! re-attaching a column share the data instead of copying it.
//!
//! ## Construction
//!
//! ```rust
//! use rust_dataframe::column::Column;
//! use rust_dataframe::inference::Infer;
//! use rust_dataframe::types::{BaseType, DataType, Value};
//!
//! let x = Column::create_with_type_inference(
//!     "x",
//!     vec![Value::Int32(1), Value::Null, Value::Int32(3)],
//!     None,
//! )
//! .unwrap();
//! assert_eq!(x.data_type(), DataType::nullable(BaseType::Int32));
//! assert!(x.has_nulls());
//!
//! // A non-nullable declared type with a null present is rejected under `Infer::None`.
//! let err = Column::create_value_column(
//!     "y",
//!     vec![Value::Null],
//!     DataType::of(BaseType::Int64),
//!     Infer::None,
//!     None,
//! );
//! assert!(err.is_err());
//! ```

mod frame;
mod group;
mod value;

use std::collections::HashSet;
use std::ops::Range;

use crate::error::{FrameError, FrameResult};
use crate::frame::{concat, DataFrame};
use crate::inference::{check_values, guess_type, refine_value_type, scan, Infer};
use crate::types::{BaseType, ColumnKind, DataType, Value};

pub use frame::FrameColumn;
pub use group::ColumnGroup;
pub use value::ValueColumn;

/// A named column of one of the three kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Scalar values.
    Value(ValueColumn),
    /// Nested record per row.
    Group(ColumnGroup),
    /// Embedded table per row.
    Frame(FrameColumn),
}

impl Column {
    /// Create a value column, refining `data_type` according to `infer`.
    ///
    /// Fails with [`FrameError::TypeMismatch`] if an element is not legal for the resulting
    /// type, e.g. a null under a non-nullable type with [`Infer::None`], or if the values refine
    /// to a record or table type (use [`Column::create`] for those).
    pub fn create_value_column(
        name: &str,
        values: Vec<Value>,
        data_type: DataType,
        infer: Infer,
        default_value: Option<Value>,
    ) -> FrameResult<ValueColumn> {
        let data_type = refine_value_type(name, &values, data_type, infer)?;
        check_values(name, &values, data_type)?;
        if let Some(default) = &default_value {
            if !data_type.with_nullable(true).accepts(default) {
                return Err(FrameError::type_mismatch(
                    name,
                    format!("default value is not a {data_type}"),
                ));
            }
        }
        Ok(ValueColumn::from_parts(
            name,
            values.into(),
            data_type,
            default_value,
        ))
    }

    /// Create a column whose type is guessed from `values`.
    ///
    /// Sequences whose non-null elements are all rows become a [`ColumnGroup`]; all frames
    /// become a [`FrameColumn`] (nulls turn into empty tables). Anything else becomes a
    /// [`ValueColumn`] of the narrowest consistent type, nullable iff a null is present unless
    /// `nullable` forces it.
    pub fn create_with_type_inference(
        name: &str,
        values: Vec<Value>,
        nullable: Option<bool>,
    ) -> FrameResult<Column> {
        let s = scan(&values);
        if s.non_null > 0 {
            match s.base {
                BaseType::Row => return Ok(Column::Group(group_from_rows(name, &values)?)),
                BaseType::Frame => return Ok(Column::Frame(frame_from_cells(name, values)?)),
                _ => {}
            }
        }
        let data_type = guess_type(&values, nullable);
        check_values(name, &values, data_type)?;
        Ok(Column::Value(ValueColumn::from_parts(
            name,
            values.into(),
            data_type,
            None,
        )))
    }

    /// Wrap a table as a nested column.
    pub fn create_column_group(name: &str, frame: DataFrame) -> ColumnGroup {
        ColumnGroup::new(name, frame)
    }

    /// Wrap one table per row as a frame column. The aggregate schema is computed lazily.
    pub fn create_frame_column(name: &str, frames: Vec<DataFrame>) -> FrameColumn {
        FrameColumn::new(name, frames.into())
    }

    /// Like [`Column::create_frame_column`], with a schema supplied up front.
    pub fn create_frame_column_with_schema(
        name: &str,
        frames: Vec<DataFrame>,
        schema: crate::schema::DataFrameSchema,
    ) -> FrameColumn {
        FrameColumn::with_schema(name, frames.into(), schema)
    }

    /// Split `frame` into consecutive row ranges starting at `start_indices`.
    ///
    /// Each start index opens a group that runs to the next start index (or the end of the
    /// table); rows before the first start index are dropped. Start indices must be
    /// non-decreasing and not exceed the row count. The aggregate schema is the source table's.
    pub fn create_frame_column_split(
        name: &str,
        frame: &DataFrame,
        start_indices: &[usize],
    ) -> FrameResult<FrameColumn> {
        let nrow = frame.row_count();
        let mut groups = Vec::with_capacity(start_indices.len());
        for (i, &start) in start_indices.iter().enumerate() {
            let end = start_indices.get(i + 1).copied().unwrap_or(nrow);
            if start > end {
                return Err(FrameError::InvalidRowSelection {
                    message: format!(
                        "start indices of '{name}' decrease at position {}: {start} > {end}",
                        i + 1
                    ),
                });
            }
            groups.push(frame.slice_rows(start..end)?);
        }
        Ok(FrameColumn::with_schema_source(
            name,
            groups.into(),
            frame.clone(),
        ))
    }

    /// Create a column of the kind named by `data_type`.
    ///
    /// - value kinds go through [`Column::create_value_column`]
    /// - `Row`: every element is a single-row table (or null); the rows are concatenated into one
    ///   table and wrapped as a group
    /// - `Frame`: every element is a table (or null, meaning an empty table)
    pub fn create(
        name: &str,
        values: Vec<Value>,
        data_type: DataType,
        infer: Infer,
    ) -> FrameResult<Column> {
        match data_type.kind() {
            ColumnKind::Value => Ok(Column::Value(Column::create_value_column(
                name, values, data_type, infer, None,
            )?)),
            ColumnKind::Group => Ok(Column::Group(group_from_rows(name, &values)?)),
            ColumnKind::Frame => Ok(Column::Frame(frame_from_cells(name, values)?)),
        }
    }

    /// Zero-length value column.
    pub fn empty(name: &str) -> Column {
        Column::Value(ValueColumn::from_parts(
            name,
            Vec::new().into(),
            DataType::of(BaseType::Nothing),
            None,
        ))
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Value(c) => c.name(),
            Column::Group(c) => c.name(),
            Column::Frame(c) => c.name(),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Value(_) => ColumnKind::Value,
            Column::Group(_) => ColumnKind::Group,
            Column::Frame(_) => ColumnKind::Frame,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Column::Value(c) => c.size(),
            Column::Group(c) => c.size(),
            Column::Frame(c) => c.size(),
        }
    }

    /// Always `0..size`.
    pub fn indices(&self) -> Range<usize> {
        0..self.size()
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Column::Value(c) => c.data_type(),
            Column::Group(_) => DataType::of(BaseType::Row),
            Column::Frame(_) => DataType::of(BaseType::Frame),
        }
    }

    /// Group and frame columns never hold nulls: a missing record or table is an empty one.
    pub fn has_nulls(&self) -> bool {
        match self {
            Column::Value(c) => c.has_nulls(),
            Column::Group(_) | Column::Frame(_) => false,
        }
    }

    /// Cell at `index` as a [`Value`]. Group cells are single-row tables.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Column::Value(c) => c.get(index).cloned(),
            Column::Group(c) => (index < c.size())
                .then(|| Value::Row(c.frame().select_rows(&[index]))),
            Column::Frame(c) => c.get(index).cloned().map(Value::Frame),
        }
    }

    /// Iterate over all cells in row order.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.indices().filter_map(move |i| self.get(i))
    }

    pub fn rename(&self, new_name: &str) -> Column {
        match self {
            Column::Value(c) => Column::Value(c.rename(new_name)),
            Column::Group(c) => Column::Group(c.rename(new_name)),
            Column::Frame(c) => Column::Frame(c.rename(new_name)),
        }
    }

    /// Select rows by index, in the given order (repeats allowed).
    ///
    /// Fails with [`FrameError::InvalidRowSelection`] if an index is out of range.
    pub fn take(&self, indices: &[usize]) -> FrameResult<Column> {
        let size = self.size();
        if let Some(&bad) = indices.iter().find(|&&i| i >= size) {
            return Err(FrameError::row_out_of_range(bad, size));
        }
        Ok(self.select(indices))
    }

    /// Contiguous row range.
    pub fn slice(&self, range: Range<usize>) -> FrameResult<Column> {
        if range.start > range.end || range.end > self.size() {
            return Err(FrameError::InvalidRowSelection {
                message: format!(
                    "rows {}..{} do not fit column '{}' of {} rows",
                    range.start,
                    range.end,
                    self.name(),
                    self.size()
                ),
            });
        }
        let indices: Vec<usize> = range.collect();
        Ok(self.select(&indices))
    }

    /// Unchecked counterpart of [`Column::take`]; every index must be in range.
    pub(crate) fn select(&self, indices: &[usize]) -> Column {
        match self {
            Column::Value(c) => {
                let values = indices.iter().map(|&i| c.values()[i].clone()).collect();
                Column::Value(c.with_values(values))
            }
            Column::Group(c) => Column::Group(c.with_frame(c.frame().select_rows(indices))),
            Column::Frame(c) => {
                let frames = indices.iter().map(|&i| c.frames()[i].clone()).collect();
                Column::Frame(c.with_frames(frames))
            }
        }
    }

    /// First occurrence of every distinct cell, in row order.
    pub fn distinct(&self) -> Column {
        let mut seen = HashSet::new();
        let keep: Vec<usize> = self
            .indices()
            .filter(|&i| self.get(i).is_some_and(|v| seen.insert(v.key())))
            .collect();
        self.select(&keep)
    }

    pub fn as_value_column(&self) -> Option<&ValueColumn> {
        match self {
            Column::Value(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&ColumnGroup> {
        match self {
            Column::Group(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_frame_column(&self) -> Option<&FrameColumn> {
        match self {
            Column::Frame(c) => Some(c),
            _ => None,
        }
    }

    /// Returns `true` if both columns share the same underlying storage.
    pub fn ptr_eq(a: &Column, b: &Column) -> bool {
        match (a, b) {
            (Column::Value(a), Column::Value(b)) => a.shares_values_with(b),
            (Column::Group(a), Column::Group(b)) => DataFrame::ptr_eq(a.frame(), b.frame()),
            (Column::Frame(a), Column::Frame(b)) => a.shares_frames_with(b),
            _ => false,
        }
    }
}

impl From<ValueColumn> for Column {
    fn from(c: ValueColumn) -> Self {
        Column::Value(c)
    }
}

impl From<ColumnGroup> for Column {
    fn from(c: ColumnGroup) -> Self {
        Column::Group(c)
    }
}

impl From<FrameColumn> for Column {
    fn from(c: FrameColumn) -> Self {
        Column::Frame(c)
    }
}

fn group_from_rows(name: &str, values: &[Value]) -> FrameResult<ColumnGroup> {
    let mut rows = Vec::with_capacity(values.len());
    for (row, v) in values.iter().enumerate() {
        match v {
            Value::Null => rows.push(DataFrame::empty_rows(1)),
            Value::Row(df) if df.row_count() == 1 => rows.push(df.clone()),
            Value::Row(df) => {
                return Err(FrameError::LengthMismatch {
                    column: format!("{name}[{row}]"),
                    expected: 1,
                    actual: df.row_count(),
                });
            }
            other => {
                return Err(FrameError::type_mismatch(
                    name,
                    format!("row {row} holds {other}, expected a record"),
                ));
            }
        }
    }
    Ok(ColumnGroup::new(name, concat(&rows)?))
}

fn frame_from_cells(name: &str, values: Vec<Value>) -> FrameResult<FrameColumn> {
    let mut frames = Vec::with_capacity(values.len());
    for (row, v) in values.into_iter().enumerate() {
        match v {
            Value::Null => frames.push(DataFrame::empty()),
            Value::Frame(df) => frames.push(df),
            other => {
                return Err(FrameError::type_mismatch(
                    name,
                    format!("row {row} holds {other}, expected a table"),
                ));
            }
        }
    }
    Ok(FrameColumn::new(name, frames.into()))
}

#[cfg(test)]
mod tests {
    use super::Column;
    use crate::error::FrameError;
    use crate::frame::DataFrame;
    use crate::inference::Infer;
    use crate::types::{BaseType, ColumnKind, DataType, Value};

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int64).collect()
    }

    fn record(name: &str, v: i64) -> Value {
        let col = Column::create_with_type_inference(name, vec![Value::Int64(v)], None).unwrap();
        Value::Row(DataFrame::new(vec![col]).unwrap())
    }

    #[test]
    fn create_with_type_inference_detects_nullable_int() {
        let c = Column::create_with_type_inference(
            "x",
            vec![Value::Int32(1), Value::Null, Value::Int32(3)],
            None,
        )
        .unwrap();
        assert_eq!(c.kind(), ColumnKind::Value);
        assert_eq!(c.data_type(), DataType::nullable(BaseType::Int32));
        assert!(c.has_nulls());
        assert_eq!(c.indices(), 0..3);
    }

    #[test]
    fn create_with_type_inference_rejects_forced_non_null() {
        let err = Column::create_with_type_inference("x", vec![Value::Null], Some(false))
            .unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { .. }));
    }

    #[test]
    fn create_with_type_inference_builds_group_from_rows() {
        let c = Column::create_with_type_inference(
            "g",
            vec![record("a", 1), Value::Null, record("a", 3)],
            None,
        )
        .unwrap();
        let group = c.as_group().unwrap();
        assert_eq!(group.size(), 3);
        let a = group.frame().column("a").unwrap();
        assert_eq!(a.values().collect::<Vec<_>>(), vec![
            Value::Int64(1),
            Value::Null,
            Value::Int64(3)
        ]);
    }

    #[test]
    fn create_with_type_inference_builds_frame_column() {
        let inner = DataFrame::new(vec![Column::create_with_type_inference(
            "a",
            ints(&[1, 2]),
            None,
        )
        .unwrap()])
        .unwrap();
        let c = Column::create_with_type_inference(
            "f",
            vec![Value::Frame(inner.clone()), Value::Null],
            None,
        )
        .unwrap();
        let f = c.as_frame_column().unwrap();
        assert_eq!(f.size(), 2);
        assert_eq!(f.get(0), Some(&inner));
        assert_eq!(f.get(1).map(DataFrame::row_count), Some(0));
    }

    #[test]
    fn create_dispatches_on_kind() {
        let v = Column::create(
            "v",
            ints(&[1, 2]),
            DataType::of(BaseType::Int64),
            Infer::None,
        )
        .unwrap();
        assert_eq!(v.kind(), ColumnKind::Value);

        let g = Column::create(
            "g",
            vec![record("a", 1), record("a", 2)],
            DataType::of(BaseType::Row),
            Infer::None,
        )
        .unwrap();
        assert_eq!(g.kind(), ColumnKind::Group);
        assert_eq!(g.size(), 2);

        let f = Column::create(
            "f",
            vec![Value::Null],
            DataType::of(BaseType::Frame),
            Infer::None,
        )
        .unwrap();
        assert_eq!(f.kind(), ColumnKind::Frame);
    }

    #[test]
    fn create_group_rejects_scalars() {
        let err = Column::create(
            "g",
            ints(&[1]),
            DataType::of(BaseType::Row),
            Infer::None,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { .. }));
    }

    #[test]
    fn value_column_default_covers_out_of_range() {
        let c = Column::create_value_column(
            "x",
            ints(&[1]),
            DataType::of(BaseType::Int64),
            Infer::None,
            Some(Value::Int64(0)),
        )
        .unwrap();
        assert_eq!(c.get_or_default(0), Value::Int64(1));
        assert_eq!(c.get_or_default(5), Value::Int64(0));
    }

    #[test]
    fn rename_shares_storage() {
        let c = Column::create_with_type_inference("x", ints(&[1, 2]), None).unwrap();
        let r = c.rename("y");
        assert_eq!(r.name(), "y");
        assert!(Column::ptr_eq(&c, &r));
        assert_eq!(c.name(), "x");
    }

    #[test]
    fn take_slice_and_distinct() {
        let c = Column::create_with_type_inference("x", ints(&[3, 1, 3, 2, 1]), None).unwrap();
        assert_eq!(
            c.take(&[4, 0]).unwrap().values().collect::<Vec<_>>(),
            ints(&[1, 3])
        );
        assert_eq!(
            c.slice(1..3).unwrap().values().collect::<Vec<_>>(),
            ints(&[1, 3])
        );
        assert!(matches!(
            c.take(&[5]),
            Err(FrameError::InvalidRowSelection { .. })
        ));
        assert!(matches!(
            c.slice(4..6),
            Err(FrameError::InvalidRowSelection { .. })
        ));
        assert_eq!(
            c.distinct().values().collect::<Vec<_>>(),
            ints(&[3, 1, 2])
        );
    }

    #[test]
    fn split_frame_column_uses_source_schema() {
        let df = DataFrame::new(vec![Column::create_with_type_inference(
            "a",
            ints(&[1, 2, 3, 4]),
            None,
        )
        .unwrap()])
        .unwrap();
        let f = Column::create_frame_column_split("parts", &df, &[0, 1, 3]).unwrap();
        let sizes: Vec<usize> = f.frames().iter().map(DataFrame::row_count).collect();
        assert_eq!(sizes, vec![1, 2, 1]);
        assert!(!f.is_schema_computed());
        assert_eq!(f.schema(), &df.schema());
        assert!(f.is_schema_computed());

        // Selecting rows keeps the source schema.
        let picked = Column::Frame(f).take(&[2, 0]).unwrap();
        assert_eq!(
            picked.as_frame_column().unwrap().schema(),
            &df.schema()
        );

        assert!(matches!(
            Column::create_frame_column_split("bad", &df, &[3, 1]),
            Err(FrameError::InvalidRowSelection { .. })
        ));
        assert!(matches!(
            Column::create_frame_column_split("bad", &df, &[5]),
            Err(FrameError::InvalidRowSelection { .. })
        ));
    }

    #[test]
    fn explicit_frame_schema_is_not_recomputed() {
        let sub = DataFrame::new(vec![
            Column::create_with_type_inference("a", ints(&[1]), None).unwrap(),
        ])
        .unwrap();
        let declared = DataFrame::empty().schema();
        let f = Column::create_frame_column_with_schema("parts", vec![sub], declared.clone());
        assert!(f.is_schema_computed());
        assert_eq!(f.schema(), &declared);

        let picked = Column::Frame(f).slice(0..1).unwrap();
        assert_eq!(picked.as_frame_column().unwrap().schema(), &declared);
    }

    #[test]
    fn empty_column_has_no_rows() {
        let c = Column::empty("e");
        assert_eq!(c.size(), 0);
        assert_eq!(c.data_type(), DataType::of(BaseType::Nothing));
    }
}
