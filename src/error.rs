use thiserror::Error;

use crate::observability::TransformSeverity;
use crate::path::ColumnPath;

/// Convenience result type for construction and transformation operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Error type returned by column construction and table transformations.
///
/// A failed operation never leaves a partially built table behind: the input table is untouched
/// and no output table exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// A declared type is incompatible with a contained (or inferred) element.
    #[error("type mismatch in column '{column}': {message}")]
    TypeMismatch { column: String, message: String },

    /// A column length differs from the row count of the table it is attached to.
    #[error("length mismatch for column '{column}': expected {expected} rows, got {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A [`ColumnPath`] does not resolve against the supplied table.
    #[error("column path not found: '{path}'")]
    PathNotFound { path: ColumnPath },

    /// Two columns with the same name would end up at the same nesting level.
    #[error("duplicate column name '{name}' under '{parent}'")]
    DuplicateSiblingName { name: String, parent: ColumnPath },

    /// Two schemas differ in shape.
    #[error("schema incompatible: {message}")]
    SchemaIncompatible { message: String },

    /// Row indices or ranges that do not fit the table they select from.
    #[error("invalid row selection: {message}")]
    InvalidRowSelection { message: String },
}

impl FrameError {
    pub(crate) fn path_not_found(path: impl Into<ColumnPath>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    pub(crate) fn row_out_of_range(index: usize, row_count: usize) -> Self {
        Self::InvalidRowSelection {
            message: format!("row {index} is out of range for {row_count} rows"),
        }
    }

    pub(crate) fn type_mismatch(column: &str, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            column: column.to_string(),
            message: message.into(),
        }
    }

    /// Severity used by transformation observers.
    ///
    /// Type and schema errors mean the data contract itself is broken and are `Critical`;
    /// everything else is an ordinary `Error`.
    pub fn severity(&self) -> TransformSeverity {
        match self {
            FrameError::TypeMismatch { .. } | FrameError::SchemaIncompatible { .. } => {
                TransformSeverity::Critical
            }
            FrameError::LengthMismatch { .. }
            | FrameError::PathNotFound { .. }
            | FrameError::DuplicateSiblingName { .. }
            | FrameError::InvalidRowSelection { .. } => TransformSeverity::Error,
        }
    }
}
