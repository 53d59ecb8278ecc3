//! Batch add through a builder.
//!
//! [`DataFrame::add_batch`] hands an [`AddDsl`] to a closure. Each builder call appends one
//! column to an ordered list; when the closure returns, the table is rebuilt from the original
//! columns followed by the accumulated ones, in call order, and validated as a whole. If any
//! call fails, nothing is added.

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::frame::DataFrame;
use crate::observability::{TransformContext, TransformKind};
use crate::path::{ColumnPath, ColumnReference, ColumnResolutionContext, ColumnWithPath};
use crate::row::AddDataRow;
use crate::types::Value;

use super::add::transform_stats;
use super::map::evaluate;
use super::AddOptions;

/// Column accumulator for [`DataFrame::add_batch`].
#[derive(Debug)]
pub struct AddDsl<'a> {
    df: &'a DataFrame,
    columns: Vec<Column>,
}

impl<'a> AddDsl<'a> {
    pub(crate) fn new(df: &'a DataFrame) -> Self {
        Self {
            df,
            columns: Vec::new(),
        }
    }

    /// The table being extended.
    pub fn frame(&self) -> &'a DataFrame {
        self.df
    }

    /// Add the referenced column as it is. Nested columns come up to the top level under their
    /// own name.
    pub fn add_column<R>(&mut self, reference: &R) -> FrameResult<()>
    where
        R: ColumnReference + ?Sized,
    {
        let found = self.resolve(reference)?;
        self.columns.push(found.column);
        Ok(())
    }

    /// Add the referenced column under `new_name`.
    pub fn rename_and_add<R>(&mut self, reference: &R, new_name: &str) -> FrameResult<()>
    where
        R: ColumnReference + ?Sized,
    {
        let found = self.resolve(reference)?;
        self.columns.push(found.column.rename(new_name));
        Ok(())
    }

    /// `name` from an existing column.
    pub fn add_from<R>(&mut self, name: &str, reference: &R) -> FrameResult<()>
    where
        R: ColumnReference + ?Sized,
    {
        self.rename_and_add(reference, name)
    }

    /// `name` from a row expression.
    ///
    /// The expression sees the original rows and, through [`AddDataRow::pending`], the columns
    /// accumulated so far in this batch.
    pub fn bind_expression<V, F>(&mut self, name: &str, expression: F) -> FrameResult<()>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        self.bind_expression_with(name, &AddOptions::default(), expression)
    }

    /// Like [`AddDsl::bind_expression`], typed according to `options`.
    ///
    /// Only the typing fields of `options` are used; the batch reports once, at the end.
    pub fn bind_expression_with<V, F>(
        &mut self,
        name: &str,
        options: &AddOptions,
        expression: F,
    ) -> FrameResult<()>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        let column = evaluate(self.df, name, options, &self.columns, expression)?;
        self.columns.push(column);
        Ok(())
    }

    /// Add the column `reference` points at under the name `target` carries.
    pub fn retarget<R, T>(&mut self, reference: &R, target: &T) -> FrameResult<()>
    where
        R: ColumnReference + ?Sized,
        T: ColumnReference + ?Sized,
    {
        self.rename_and_add(reference, target.name())
    }

    /// Columns accumulated so far, in call order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    fn resolve<R>(&self, reference: &R) -> FrameResult<ColumnWithPath>
    where
        R: ColumnReference + ?Sized,
    {
        reference
            .resolve_single(&ColumnResolutionContext::new(self.df))
            .ok_or_else(|| FrameError::path_not_found(reference.path()))
    }
}

impl DataFrame {
    /// Add several columns in one step through an [`AddDsl`] builder.
    pub fn add_batch<F>(&self, body: F) -> FrameResult<DataFrame>
    where
        F: FnOnce(&mut AddDsl<'_>) -> FrameResult<()>,
    {
        self.add_batch_with(&AddOptions::default(), body)
    }

    pub fn add_batch_with<F>(&self, options: &AddOptions, body: F) -> FrameResult<DataFrame>
    where
        F: FnOnce(&mut AddDsl<'_>) -> FrameResult<()>,
    {
        let ctx = TransformContext::new(TransformKind::AddBatch, ColumnPath::root());
        let mut dsl = AddDsl::new(self);
        let result = body(&mut dsl).and_then(|()| self.add_columns(dsl.into_columns()));
        options.report(&ctx, result, |out| transform_stats(self, out))
    }
}
