//! Row expression evaluation into a standalone column.

use crate::column::Column;
use crate::error::FrameResult;
use crate::frame::DataFrame;
use crate::inference::{guess_type, refine_value_type, Infer};
use crate::row::AddDataRow;
use crate::types::{ColumnKind, DataType, Value};

use super::AddOptions;

/// Evaluate `expression` for every row of `df` into a new column named `name`.
///
/// This is a convenience wrapper around [`DataFrame::map_to_column`] with default options.
pub fn map<V, F>(df: &DataFrame, name: &str, expression: F) -> FrameResult<Column>
where
    V: Into<Value>,
    F: FnMut(&AddDataRow<'_>) -> V,
{
    df.map_to_column(name, &AddOptions::default(), expression)
}

impl DataFrame {
    /// Evaluate `expression` for every row, in row order, into a new column.
    ///
    /// The column is not attached to any table. Its type follows `options` (see
    /// [`AddOptions::data_type`]).
    pub fn map_to_column<V, F>(
        &self,
        name: &str,
        options: &AddOptions,
        expression: F,
    ) -> FrameResult<Column>
    where
        V: Into<Value>,
        F: FnMut(&AddDataRow<'_>) -> V,
    {
        evaluate(self, name, options, &[], expression)
    }
}

/// Evaluate rows sequentially, exposing the values computed so far and the `pending` columns
/// to every call.
pub(crate) fn evaluate<V, F>(
    df: &DataFrame,
    name: &str,
    options: &AddOptions,
    pending: &[Column],
    expression: F,
) -> FrameResult<Column>
where
    V: Into<Value>,
    F: FnMut(&AddDataRow<'_>) -> V,
{
    let values = evaluate_values(df, pending, expression);
    let data_type = column_type(name, &values, options)?;
    column_from_values(name, values, data_type)
}

pub(crate) fn evaluate_values<V, F>(
    df: &DataFrame,
    pending: &[Column],
    mut expression: F,
) -> Vec<Value>
where
    V: Into<Value>,
    F: FnMut(&AddDataRow<'_>) -> V,
{
    let mut values: Vec<Value> = Vec::with_capacity(df.row_count());
    for row in df.rows() {
        let v = expression(&AddDataRow::new(row, &values, pending)).into();
        values.push(v);
    }
    values
}

/// Type of a computed column holding `values`: declared (and refined) through `options`, or
/// guessed from the values when no type is declared.
pub(crate) fn column_type(
    name: &str,
    values: &[Value],
    options: &AddOptions,
) -> FrameResult<DataType> {
    match options.data_type {
        Some(declared) if declared.kind() == ColumnKind::Value => {
            refine_value_type(name, values, declared, options.infer)
        }
        Some(declared) => Ok(declared),
        None => Ok(guess_type(values, None)),
    }
}

/// Build a column of the already settled `data_type`. Record and table types produce group and
/// frame columns.
pub(crate) fn column_from_values(
    name: &str,
    values: Vec<Value>,
    data_type: DataType,
) -> FrameResult<Column> {
    Column::create(name, values, data_type, Infer::None)
}
