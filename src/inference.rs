//! Column type inference.
//!
//! Inference is a pure function of a value sequence and caller hints. It dispatches over the
//! closed set of runtime tags in [`Value`] and widens them along the [`BaseType`] lattice:
//!
//! - `Nothing` is the bottom (no non-null element seen), `Any` is the top
//! - `Int32` widens to `Int64`, any mix of numeric tags widens to `Number`
//! - anything else that disagrees widens to `Any`

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::types::{BaseType, ColumnKind, DataType, Value};

/// How much of a value sequence is scanned to determine a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Infer {
    /// Trust the caller-supplied type; do not scan.
    None,
    /// Scan only to decide nullability; keep the caller's base type.
    #[default]
    Nulls,
    /// Scan to redetermine both base type and nullability.
    Full,
}

/// Summary of one pass over a value sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scan {
    /// Common supertype of all non-null elements (`Nothing` if there are none).
    pub base: BaseType,
    pub has_nulls: bool,
    pub non_null: usize,
}

pub(crate) fn scan(values: &[Value]) -> Scan {
    let mut out = Scan {
        base: BaseType::Nothing,
        has_nulls: false,
        non_null: 0,
    };
    for v in values {
        match v.base_type() {
            None => out.has_nulls = true,
            Some(tag) => {
                out.base = out.base.common_supertype(tag);
                out.non_null += 1;
            }
        }
    }
    out
}

/// Refine `declared` from `values` according to `infer`.
///
/// Under [`Infer::Full`] a sequence without any non-null element keeps the declared base type.
/// This function never fails; use [`check_values`] to validate the result.
pub fn infer_type(values: &[Value], declared: DataType, infer: Infer) -> DataType {
    match infer {
        Infer::None => declared,
        Infer::Nulls => declared.with_nullable(values.iter().any(Value::is_null)),
        Infer::Full => {
            let s = scan(values);
            if s.non_null == 0 {
                declared.with_nullable(s.has_nulls)
            } else {
                DataType::new(s.base, s.has_nulls)
            }
        }
    }
}

/// [`infer_type`] for a value column. Both the declared and the refined type must be value
/// types; records and tables go through group and frame columns instead.
pub(crate) fn refine_value_type(
    column: &str,
    values: &[Value],
    declared: DataType,
    infer: Infer,
) -> FrameResult<DataType> {
    if declared.kind() != ColumnKind::Value {
        return Err(FrameError::type_mismatch(
            column,
            format!("{declared} is not a value type"),
        ));
    }
    let refined = infer_type(values, declared, infer);
    if refined.kind() != ColumnKind::Value {
        return Err(FrameError::type_mismatch(
            column,
            format!("values refine to {refined}, which is not a value type"),
        ));
    }
    Ok(refined)
}

/// Pick the narrowest type consistent with `values`.
///
/// - empty input: `Nothing`, nullable only if `nullable` says so
/// - all elements null: nullable `Any`
/// - otherwise the common supertype of the element tags, nullable iff a null is present
///
/// A `Some` nullable hint overrides the scanned nullability.
pub fn guess_type(values: &[Value], nullable: Option<bool>) -> DataType {
    let s = scan(values);
    if values.is_empty() {
        return DataType::new(BaseType::Nothing, nullable.unwrap_or(false));
    }
    if s.non_null == 0 {
        return DataType::new(BaseType::Any, nullable.unwrap_or(true));
    }
    DataType::new(s.base, nullable.unwrap_or(s.has_nulls))
}

/// Verify that every element of `values` is legal for `data_type`.
pub fn check_values(column: &str, values: &[Value], data_type: DataType) -> FrameResult<()> {
    match values.iter().position(|v| !data_type.accepts(v)) {
        None => Ok(()),
        Some(row) => {
            let found = values[row]
                .base_type()
                .map_or_else(|| "null".to_string(), |t| t.to_string());
            Err(FrameError::type_mismatch(
                column,
                format!("row {row} holds {found}, which is not a {data_type}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{check_values, guess_type, infer_type, refine_value_type, Infer};
    use crate::error::FrameError;
    use crate::types::{BaseType, DataType, Value};

    #[test]
    fn guess_picks_nullable_int_for_ints_with_null() {
        let values = vec![Value::Int32(1), Value::Null, Value::Int32(3)];
        assert_eq!(guess_type(&values, None), DataType::nullable(BaseType::Int32));
    }

    #[test]
    fn guess_all_null_is_nullable_any() {
        let values = vec![Value::Null, Value::Null];
        assert_eq!(guess_type(&values, None), DataType::nullable(BaseType::Any));
    }

    #[test]
    fn guess_empty_is_nothing() {
        assert_eq!(guess_type(&[], None), DataType::of(BaseType::Nothing));
        assert_eq!(guess_type(&[], Some(true)), DataType::nullable(BaseType::Nothing));
    }

    #[test]
    fn guess_mixed_numeric_is_number() {
        let values = vec![Value::Int64(1), Value::Float64(2.5)];
        assert_eq!(guess_type(&values, None), DataType::of(BaseType::Number));
    }

    #[test]
    fn guess_is_idempotent() {
        let values = vec![Value::Utf8("a".into()), Value::Null];
        let first = guess_type(&values, None);
        let again = guess_type(&values, None);
        assert_eq!(first, again);
        assert_eq!(first, DataType::nullable(BaseType::Utf8));
    }

    #[test]
    fn infer_none_trusts_declared() {
        let declared = DataType::of(BaseType::Any);
        let values = vec![Value::Null];
        assert_eq!(infer_type(&values, declared, Infer::None), declared);
    }

    #[test]
    fn infer_nulls_only_touches_nullability() {
        let declared = DataType::nullable(BaseType::Number);
        let values = vec![Value::Int32(1), Value::Int32(2)];
        assert_eq!(
            infer_type(&values, declared, Infer::Nulls),
            DataType::of(BaseType::Number)
        );
    }

    #[test]
    fn infer_full_redetermines_base() {
        let declared = DataType::of(BaseType::Any);
        let values = vec![Value::Int32(1), Value::Null];
        assert_eq!(
            infer_type(&values, declared, Infer::Full),
            DataType::nullable(BaseType::Int32)
        );
        assert_eq!(
            infer_type(&[Value::Null], DataType::of(BaseType::Utf8), Infer::Full),
            DataType::nullable(BaseType::Utf8)
        );
    }

    #[test]
    fn value_refinement_never_yields_a_nested_kind() {
        let row = Value::Row(crate::frame::DataFrame::empty_rows(1));
        let err = refine_value_type("g", &[row], DataType::of(BaseType::Any), Infer::Full)
            .unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { .. }));

        let err = refine_value_type("g", &[], DataType::of(BaseType::Frame), Infer::None)
            .unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch { .. }));

        let mixed = vec![Value::Int64(1), Value::Row(crate::frame::DataFrame::empty_rows(1))];
        assert_eq!(
            refine_value_type("g", &mixed, DataType::of(BaseType::Any), Infer::Full).unwrap(),
            DataType::of(BaseType::Any)
        );
    }

    #[test]
    fn check_values_reports_first_offending_row() {
        let values = vec![Value::Int64(1), Value::Null];
        let err = check_values("x", &values, DataType::of(BaseType::Int64)).unwrap_err();
        match err {
            FrameError::TypeMismatch { column, message } => {
                assert_eq!(column, "x");
                assert!(message.contains("row 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
