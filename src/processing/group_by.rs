//! Grouped views and group-scoped transformations.
//!
//! [`DataFrame::group_by`] partitions rows by the values of key columns. The result is a
//! [`GroupBy`]: one row per distinct key, in order of first occurrence, carrying the key values
//! and a frame column holding each group's rows (in their original relative order).

use std::collections::HashMap;

use crate::column::{Column, FrameColumn};
use crate::error::{FrameError, FrameResult};
use crate::frame::{concat, DataFrame};
use crate::observability::{TransformContext, TransformKind, TransformStats};
use crate::path::ColumnPath;
use crate::row::AddDataRow;
use crate::types::{Value, ValueKey};

use super::map::{column_from_values, column_type, evaluate_values};
use super::AddOptions;

/// Name of the frame column holding the groups in [`GroupBy::into_frame`].
pub const GROUPS_COLUMN: &str = "group";

/// A table partitioned into groups.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    keys: DataFrame,
    groups: FrameColumn,
}

impl DataFrame {
    /// Partition rows by the values of the top-level columns `keys`.
    ///
    /// Every group holds complete rows (key columns included). With no keys, all rows form a
    /// single group.
    pub fn group_by(&self, keys: &[&str]) -> FrameResult<GroupBy> {
        let mut key_columns = Vec::with_capacity(keys.len());
        for name in keys {
            let column = self
                .column(name)
                .ok_or_else(|| FrameError::path_not_found(*name))?;
            key_columns.push(column);
        }

        let mut index: HashMap<Vec<ValueKey>, usize> = HashMap::new();
        let mut firsts: Vec<usize> = Vec::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        for row in self.indices() {
            let key: Vec<ValueKey> = key_columns
                .iter()
                .map(|c| c.get(row).unwrap_or(Value::Null).key())
                .collect();
            let group = *index.entry(key).or_insert_with(|| {
                firsts.push(row);
                members.push(Vec::new());
                members.len() - 1
            });
            members[group].push(row);
        }

        let keys = key_columns.iter().map(|c| c.select(&firsts)).collect();
        let keys = DataFrame::with_row_count(keys, firsts.len())?;
        let frames = members.iter().map(|rows| self.select_rows(rows)).collect();
        Ok(GroupBy {
            keys,
            groups: Column::create_frame_column(GROUPS_COLUMN, frames),
        })
    }
}

impl GroupBy {
    /// Rebuild a grouped view from a table holding key columns and a frame column `groups`.
    pub fn from_frame(frame: &DataFrame, groups: &str) -> FrameResult<GroupBy> {
        let column = frame
            .column(groups)
            .ok_or_else(|| FrameError::path_not_found(groups))?;
        let groups = column
            .as_frame_column()
            .ok_or_else(|| FrameError::type_mismatch(groups, "not a frame column"))?
            .clone();
        let keys = frame.remove(column.name())?;
        Ok(GroupBy { keys, groups })
    }

    /// One row per group with the key values.
    pub fn keys(&self) -> &DataFrame {
        &self.keys
    }

    pub fn groups(&self) -> &FrameColumn {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.size()
    }

    /// Transform every group independently, in group order. Fails as a whole if any group fails.
    pub fn update_groups<F>(&self, f: F) -> FrameResult<GroupBy>
    where
        F: FnMut(&DataFrame) -> FrameResult<DataFrame>,
    {
        let frames = self
            .groups
            .frames()
            .iter()
            .map(f)
            .collect::<FrameResult<Vec<_>>>()?;
        Ok(self.with_groups(frames))
    }

    /// Add a computed column to every group. Rows are evaluated group by group, and
    /// [`AddDataRow::prev_new`] never reaches across a group boundary.
    ///
    /// The column type is settled once over the values of all groups, so every group carries
    /// the type the same add would give the ungrouped table.
    pub fn add<V, F>(&self, name: &str, expression: F) -> FrameResult<GroupBy>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        self.add_with(name, &AddOptions::default(), expression)
    }

    pub fn add_with<V, F>(
        &self,
        name: &str,
        options: &AddOptions,
        mut expression: F,
    ) -> FrameResult<GroupBy>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        let ctx = TransformContext::new(TransformKind::GroupAdd, self.target(name));
        let parts = self
            .groups
            .frames()
            .iter()
            .map(|g| evaluate_values(g, &[], &mut expression))
            .collect();
        let result = self.attach_computed(name, options, parts);
        options.report(&ctx, result, |out| self.stats(out))
    }

    /// Stack the groups back into one table, in group order.
    pub fn concat(&self) -> FrameResult<DataFrame> {
        concat(self.groups.frames())
    }

    /// Key columns followed by the [`GROUPS_COLUMN`] frame column.
    pub fn into_frame(self) -> DataFrame {
        let mut columns = self.keys.columns().to_vec();
        columns.push(Column::Frame(self.groups));
        DataFrame::from_validated(columns, self.keys.row_count())
    }

    pub(crate) fn with_groups(&self, frames: Vec<DataFrame>) -> GroupBy {
        GroupBy {
            keys: self.keys.clone(),
            groups: Column::create_frame_column(self.groups.name(), frames),
        }
    }

    /// Append one computed column per group; `parts` holds each group's values in group order.
    pub(crate) fn attach_computed(
        &self,
        name: &str,
        options: &AddOptions,
        parts: Vec<Vec<Value>>,
    ) -> FrameResult<GroupBy> {
        let sizes: Vec<usize> = parts.iter().map(Vec::len).collect();
        let values: Vec<Value> = parts.into_iter().flatten().collect();
        let data_type = column_type(name, &values, options)?;

        let mut values = values.into_iter();
        let frames = self
            .groups
            .frames()
            .iter()
            .zip(sizes)
            .map(|(g, n)| {
                let part: Vec<Value> = values.by_ref().take(n).collect();
                g.add_columns([column_from_values(name, part, data_type)?])
            })
            .collect::<FrameResult<Vec<_>>>()?;
        Ok(self.with_groups(frames))
    }

    pub(crate) fn target(&self, name: &str) -> ColumnPath {
        ColumnPath::new([self.groups.name(), name])
    }

    /// Rows across all groups; columns as seen in the aggregate group schema.
    pub(crate) fn stats(&self, out: &GroupBy) -> TransformStats {
        TransformStats {
            rows: out.groups.frames().iter().map(DataFrame::row_count).sum(),
            columns_before: self.groups.schema().len(),
            columns_after: out.groups.schema().len(),
        }
    }
}
