//! Structural edits: insert, replace, rename, remove and move columns anywhere in the group
//! tree, and (un)group top-level columns.
//!
//! A change at `a.b.c` rebuilds the tables of `a` and `a.b` and nothing else; every other
//! column of the result is the input's column, shared.

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::frame::{validate_columns, DataFrame};
use crate::path::ColumnPath;

impl DataFrame {
    /// Insert `column` as a new last field of the group addressed by all but the last segment
    /// of `path`, under the name of the last segment.
    ///
    /// A single-segment path appends at the top level.
    pub fn insert(&self, path: impl Into<ColumnPath>, column: Column) -> FrameResult<DataFrame> {
        let path = path.into();
        let (parent, name) = split_target(&path)?;
        update_group(self, parent.segments(), &ColumnPath::root(), |frame, at| {
            check_length(frame, &column, &path)?;
            if frame.column(name).is_some() {
                return Err(FrameError::DuplicateSiblingName {
                    name: name.to_string(),
                    parent: at.clone(),
                });
            }
            let mut columns = frame.columns().to_vec();
            columns.push(column.rename(name));
            Ok(DataFrame::from_validated(columns, frame.row_count()))
        })
    }

    /// Replace the column at `path` in place. The replacement takes over the old name.
    pub fn replace(&self, path: impl Into<ColumnPath>, column: Column) -> FrameResult<DataFrame> {
        let path = path.into();
        let (parent, name) = split_target(&path)?;
        update_group(self, parent.segments(), &ColumnPath::root(), |frame, _| {
            let idx = frame
                .index_of(name)
                .ok_or_else(|| FrameError::path_not_found(&path))?;
            check_length(frame, &column, &path)?;
            let mut columns = frame.columns().to_vec();
            columns[idx] = column.rename(name);
            Ok(DataFrame::from_validated(columns, frame.row_count()))
        })
    }

    /// Rename the column at `path`, keeping its position.
    pub fn rename(&self, path: impl Into<ColumnPath>, new_name: &str) -> FrameResult<DataFrame> {
        let path = path.into();
        let (parent, name) = split_target(&path)?;
        update_group(self, parent.segments(), &ColumnPath::root(), |frame, at| {
            let idx = frame
                .index_of(name)
                .ok_or_else(|| FrameError::path_not_found(&path))?;
            if name != new_name && frame.column(new_name).is_some() {
                return Err(FrameError::DuplicateSiblingName {
                    name: new_name.to_string(),
                    parent: at.clone(),
                });
            }
            let mut columns = frame.columns().to_vec();
            columns[idx] = columns[idx].rename(new_name);
            Ok(DataFrame::from_validated(columns, frame.row_count()))
        })
    }

    /// Drop the column at `path`. Groups keep their row count even when emptied.
    pub fn remove(&self, path: impl Into<ColumnPath>) -> FrameResult<DataFrame> {
        let path = path.into();
        let (parent, name) = split_target(&path)?;
        update_group(self, parent.segments(), &ColumnPath::root(), |frame, _| {
            let idx = frame
                .index_of(name)
                .ok_or_else(|| FrameError::path_not_found(&path))?;
            let mut columns = frame.columns().to_vec();
            columns.remove(idx);
            Ok(DataFrame::from_validated(columns, frame.row_count()))
        })
    }

    /// Move the column at `from` to `to` (which names the destination group and the new name).
    pub fn move_column(
        &self,
        from: impl Into<ColumnPath>,
        to: impl Into<ColumnPath>,
    ) -> FrameResult<DataFrame> {
        let found = self.get(from)?;
        self.remove(&found.path)?.insert(to, found.column)
    }

    /// Move the top-level columns `names` into a new group `into`.
    ///
    /// The group takes the position of the first moved column; its fields keep the order of
    /// `names`.
    pub fn group_columns(&self, names: &[&str], into: &str) -> FrameResult<DataFrame> {
        let mut picked = Vec::with_capacity(names.len());
        let mut position = usize::MAX;
        for name in names {
            let idx = self
                .index_of(name)
                .ok_or_else(|| FrameError::path_not_found(*name))?;
            position = position.min(idx);
            picked.push(self.columns()[idx].clone());
        }
        validate_columns(&picked, self.row_count(), &ColumnPath::of(into))?;

        let group = Column::create_column_group(
            into,
            DataFrame::from_validated(picked, self.row_count()),
        );
        let mut columns = Vec::with_capacity(self.column_count() + 1 - names.len());
        for (idx, c) in self.columns().iter().enumerate() {
            if idx == position {
                columns.push(Column::Group(group.clone()));
            }
            if !names.contains(&c.name()) {
                columns.push(c.clone());
            }
        }
        if position == usize::MAX {
            columns.push(Column::Group(group));
        }
        validate_columns(&columns, self.row_count(), &ColumnPath::root())?;
        Ok(DataFrame::from_validated(columns, self.row_count()))
    }

    /// Replace the top-level group `name` by its fields, in place.
    pub fn ungroup(&self, name: &str) -> FrameResult<DataFrame> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| FrameError::path_not_found(name))?;
        let group = self.columns()[idx]
            .as_group()
            .ok_or_else(|| FrameError::type_mismatch(name, "not a column group"))?;

        let mut columns = Vec::with_capacity(self.column_count() + group.frame().column_count());
        columns.extend_from_slice(&self.columns()[..idx]);
        columns.extend_from_slice(group.frame().columns());
        columns.extend_from_slice(&self.columns()[idx + 1..]);
        validate_columns(&columns, self.row_count(), &ColumnPath::root())?;
        Ok(DataFrame::from_validated(columns, self.row_count()))
    }
}

fn split_target(path: &ColumnPath) -> FrameResult<(ColumnPath, &str)> {
    match (path.parent(), path.name()) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(FrameError::path_not_found(ColumnPath::root())),
    }
}

fn check_length(frame: &DataFrame, column: &Column, path: &ColumnPath) -> FrameResult<()> {
    if column.size() != frame.row_count() {
        return Err(FrameError::LengthMismatch {
            column: path.to_string(),
            expected: frame.row_count(),
            actual: column.size(),
        });
    }
    Ok(())
}

/// Apply `edit` to the table of the group at `target` (relative to `frame`, which sits at
/// `at`) and rebuild every ancestor on the way back up.
pub(crate) fn update_group<F>(
    frame: &DataFrame,
    target: &[String],
    at: &ColumnPath,
    edit: F,
) -> FrameResult<DataFrame>
where
    F: FnOnce(&DataFrame, &ColumnPath) -> FrameResult<DataFrame>,
{
    let Some((first, rest)) = target.split_first() else {
        return edit(frame, at);
    };
    let here = at.child(first.as_str());
    let group = frame
        .index_of(first)
        .and_then(|idx| Some((idx, frame.columns()[idx].as_group()?)));
    let Some((idx, group)) = group else {
        return Err(FrameError::path_not_found(here));
    };

    let nested = update_group(group.frame(), rest, &here, edit)?;
    let mut columns = frame.columns().to_vec();
    columns[idx] = Column::Group(group.with_frame(nested));
    Ok(DataFrame::from_validated(columns, frame.row_count()))
}
