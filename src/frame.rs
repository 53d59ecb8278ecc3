//! The table type: an ordered sequence of equally long, uniquely named columns.
//!
//! A [`DataFrame`] is immutable. Transformations (see [`crate::processing`]) build a new table
//! that shares every unchanged column with its input.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use crate::column::{Column, ValueColumn};
use crate::error::{FrameError, FrameResult};
use crate::inference::guess_type;
use crate::path::{ColumnPath, ColumnWithPath};
use crate::row::DataRow;
use crate::types::{BaseType, ColumnKind, DataType, Value};

/// In-memory columnar table.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Arc<[Column]>,
    nrow: usize,
}

impl DataFrame {
    /// Create a table from columns. The row count is the length of the first column (zero if
    /// there are none).
    ///
    /// Fails with [`FrameError::LengthMismatch`] if the columns differ in length and with
    /// [`FrameError::DuplicateSiblingName`] if two columns share a name.
    pub fn new(columns: Vec<Column>) -> FrameResult<Self> {
        let nrow = columns.first().map_or(0, Column::size);
        Self::with_row_count(columns, nrow)
    }

    /// Create a table with an explicit row count, which every column must match.
    pub fn with_row_count(columns: Vec<Column>, nrow: usize) -> FrameResult<Self> {
        validate_columns(&columns, nrow, &ColumnPath::root())?;
        Ok(Self {
            columns: columns.into(),
            nrow,
        })
    }

    /// Table with no columns and no rows.
    pub fn empty() -> Self {
        Self::empty_rows(0)
    }

    /// Table with no columns and `nrow` rows (a record of nothing, repeated).
    pub fn empty_rows(nrow: usize) -> Self {
        Self {
            columns: Vec::new().into(),
            nrow,
        }
    }

    pub(crate) fn from_validated(columns: Vec<Column>, nrow: usize) -> Self {
        Self {
            columns: columns.into(),
            nrow,
        }
    }

    pub fn row_count(&self) -> usize {
        self.nrow
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Always `0..row_count`.
    pub fn indices(&self) -> Range<usize> {
        0..self.nrow
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Walk `path` through nested groups. The empty path resolves to nothing.
    pub fn resolve(&self, path: &ColumnPath) -> Option<ColumnWithPath> {
        let (first, rest) = path.segments().split_first()?;
        let mut column = self.column(first)?;
        for segment in rest {
            column = column.as_group()?.frame().column(segment)?;
        }
        Some(ColumnWithPath {
            column: column.clone(),
            path: path.clone(),
        })
    }

    /// Like [`DataFrame::resolve`], reporting [`FrameError::PathNotFound`] on failure.
    pub fn get(&self, path: impl Into<ColumnPath>) -> FrameResult<ColumnWithPath> {
        let path = path.into();
        self.resolve(&path).ok_or(FrameError::PathNotFound { path })
    }

    pub fn row(&self, index: usize) -> Option<DataRow<'_>> {
        (index < self.nrow).then(|| DataRow::new(self, index))
    }

    pub fn rows(&self) -> impl Iterator<Item = DataRow<'_>> {
        self.indices().map(move |i| DataRow::new(self, i))
    }

    /// Select rows by index, in the given order (repeats allowed).
    ///
    /// Fails with [`FrameError::InvalidRowSelection`] if an index is out of range.
    pub fn take_rows(&self, indices: &[usize]) -> FrameResult<DataFrame> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.nrow) {
            return Err(FrameError::row_out_of_range(bad, self.nrow));
        }
        Ok(self.select_rows(indices))
    }

    /// Contiguous row range.
    pub fn slice_rows(&self, range: Range<usize>) -> FrameResult<DataFrame> {
        if range.start > range.end || range.end > self.nrow {
            return Err(FrameError::InvalidRowSelection {
                message: format!(
                    "rows {}..{} do not fit {} rows",
                    range.start, range.end, self.nrow
                ),
            });
        }
        let indices: Vec<usize> = range.collect();
        Ok(self.select_rows(&indices))
    }

    /// Unchecked counterpart of [`DataFrame::take_rows`]; every index must be in range.
    pub(crate) fn select_rows(&self, indices: &[usize]) -> DataFrame {
        let columns = self.columns.iter().map(|c| c.select(indices)).collect();
        Self::from_validated(columns, indices.len())
    }

    /// Returns `true` if both tables share the same column storage.
    pub fn ptr_eq(a: &DataFrame, b: &DataFrame) -> bool {
        Arc::ptr_eq(&a.columns, &b.columns)
    }
}

/// Check the table invariants for `columns` attached under `parent`.
pub(crate) fn validate_columns(
    columns: &[Column],
    nrow: usize,
    parent: &ColumnPath,
) -> FrameResult<()> {
    let mut names = HashSet::with_capacity(columns.len());
    for c in columns {
        if c.size() != nrow {
            return Err(FrameError::LengthMismatch {
                column: parent.child(c.name()).to_string(),
                expected: nrow,
                actual: c.size(),
            });
        }
        if !names.insert(c.name()) {
            return Err(FrameError::DuplicateSiblingName {
                name: c.name().to_string(),
                parent: parent.clone(),
            });
        }
    }
    Ok(())
}

/// Stack tables vertically.
///
/// The result holds the union of all columns, in first-seen order. Rows of a table that lacks a
/// column are filled with that column's default value (or null); missing groups become empty
/// records and missing frame cells become empty tables. Columns present with different kinds
/// are merged into one value column.
pub fn concat(frames: &[DataFrame]) -> FrameResult<DataFrame> {
    let nrow = frames.iter().map(DataFrame::row_count).sum();
    let mut names: Vec<&str> = Vec::new();
    for df in frames {
        for name in df.column_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let parts: Vec<(Option<&Column>, usize)> = frames
            .iter()
            .map(|df| (df.column(name), df.row_count()))
            .collect();
        columns.push(concat_column(name, &parts)?);
    }
    Ok(DataFrame::from_validated(columns, nrow))
}

fn concat_column(name: &str, parts: &[(Option<&Column>, usize)]) -> FrameResult<Column> {
    let present: Vec<&Column> = parts.iter().filter_map(|(c, _)| *c).collect();
    let kind = present.first().map_or(ColumnKind::Value, |c| c.kind());
    let same_kind = present.iter().all(|c| c.kind() == kind);

    if same_kind && kind == ColumnKind::Group {
        let frames: Vec<DataFrame> = parts
            .iter()
            .map(|(c, n)| match c.and_then(Column::as_group) {
                Some(g) => g.frame().clone(),
                None => DataFrame::empty_rows(*n),
            })
            .collect();
        return Ok(Column::Group(Column::create_column_group(
            name,
            concat(&frames)?,
        )));
    }

    if same_kind && kind == ColumnKind::Frame {
        let mut frames = Vec::new();
        for (c, n) in parts {
            match c.and_then(Column::as_frame_column) {
                Some(f) => frames.extend(f.frames().iter().cloned()),
                None => frames.extend(std::iter::repeat_n(DataFrame::empty(), *n)),
            }
        }
        return Ok(Column::Frame(Column::create_frame_column(name, frames)));
    }

    let value_columns: Vec<&ValueColumn> = present
        .iter()
        .filter_map(|c| c.as_value_column())
        .collect();
    let default = value_columns.iter().find_map(|c| c.default_value()).cloned();

    let mut values = Vec::with_capacity(parts.iter().map(|(_, n)| n).sum());
    for (c, n) in parts {
        match c {
            Some(c) => values.extend(c.values()),
            None => values.extend(std::iter::repeat_n(
                default.clone().unwrap_or(Value::Null),
                *n,
            )),
        }
    }

    if same_kind && !value_columns.is_empty() {
        // A part without any non-null cell says nothing about the base type.
        let informative = value_columns
            .iter()
            .filter(|c| c.values().iter().any(|v| !v.is_null()))
            .map(|c| c.data_type())
            .reduce(DataType::union);
        let declared = informative
            .or_else(|| value_columns.iter().map(|c| c.data_type()).reduce(DataType::union))
            .unwrap_or(DataType::of(BaseType::Nothing));
        let mut declared = declared
            .with_nullable(value_columns.iter().any(|c| c.data_type().nullable));
        if let Some(tag) = default.as_ref().and_then(Value::base_type) {
            declared = declared.union(DataType::of(tag));
        }
        let data_type =
            declared.with_nullable(declared.nullable || values.iter().any(Value::is_null));
        return Ok(Column::Value(ValueColumn::from_parts(
            name,
            values.into(),
            data_type,
            default,
        )));
    }

    // Mixed kinds: fall back to a value column of whatever the cells widen to.
    let data_type = guess_type(&values, None).to_value_type();
    Ok(Column::Value(ValueColumn::from_parts(
        name,
        values.into(),
        data_type,
        None,
    )))
}
