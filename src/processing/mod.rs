//! Transformation algebra over [`crate::frame::DataFrame`].
//!
//! Every operation here returns a new table and leaves its input untouched. Unchanged columns
//! are shared, not copied; a change deep inside nested groups rebuilds only the groups along
//! the path to it.
//!
//! Currently implemented:
//!
//! - [`add`]: bulk add of existing columns, per-row computed adds (top level or along a path)
//! - [`dsl`]: batch add through the [`AddDsl`] builder
//! - [`structure`]: insert, replace, rename, remove, move, group and ungroup columns
//! - [`map()`]: evaluate a row expression into a standalone column
//! - [`filter()`]: row filtering by predicate
//! - [`group_by`]: per-group transformations over a [`GroupBy`]
//!
//! ## Example: add → add along a path → batch add
//!
//! ```rust
//! use rust_dataframe::column::Column;
//! use rust_dataframe::frame::DataFrame;
//! use rust_dataframe::path::ColumnPath;
//! use rust_dataframe::types::Value;
//!
//! let df = DataFrame::new(vec![
//!     Column::create_with_type_inference("name", vec![Value::from("a"), Value::from("b")], None)
//!         .unwrap(),
//!     Column::create_with_type_inference("age", vec![Value::Int64(10), Value::Int64(20)], None)
//!         .unwrap(),
//! ])
//! .unwrap();
//!
//! let df = df.add("age2", |row| row.i64("age").map(|a| a * 2)).unwrap();
//! assert_eq!(
//!     df.column("age2").unwrap().values().collect::<Vec<_>>(),
//!     vec![Value::Int64(20), Value::Int64(40)]
//! );
//!
//! let df = df
//!     .group_columns(&["age", "age2"], "ages")
//!     .unwrap()
//!     .add_at(ColumnPath::new(["ages", "adult"]), |row| {
//!         row.value(ColumnPath::new(["ages", "age"])).ok().and_then(|v| v.as_i64()).map(|a| a >= 18)
//!     })
//!     .unwrap();
//! assert!(df.resolve(&ColumnPath::new(["ages", "adult"])).is_some());
//!
//! let df = df
//!     .add_batch(|dsl| {
//!         dsl.bind_expression("p", |row| row.index() as i64)?;
//!         dsl.bind_expression("q", |row| row.pending("p").and_then(|v| v.as_i64()).map(|p| p + 1))?;
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(df.column_names().collect::<Vec<_>>(), vec!["name", "ages", "p", "q"]);
//! ```

pub mod add;
pub mod dsl;
pub mod filter;
pub mod group_by;
pub mod map;
pub mod structure;

use std::fmt;
use std::sync::Arc;

use crate::error::FrameResult;
use crate::inference::Infer;
use crate::observability::{TransformContext, TransformObserver, TransformSeverity, TransformStats};
use crate::types::DataType;

pub use dsl::AddDsl;
pub use filter::filter;
pub use group_by::{GroupBy, GROUPS_COLUMN};
pub use map::map;

/// Options controlling computed adds.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct AddOptions {
    /// Inference mode applied against `data_type`.
    pub infer: Infer,
    /// Declared type of the computed column.
    ///
    /// If `None`, the type is inferred from the computed values (nullable iff a null was
    /// produced) and `infer` is not consulted.
    pub data_type: Option<DataType>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn TransformObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: TransformSeverity,
}

impl fmt::Debug for AddOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddOptions")
            .field("infer", &self.infer)
            .field("data_type", &self.data_type)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            infer: Infer::Nulls,
            data_type: None,
            observer: None,
            alert_at_or_above: TransformSeverity::Critical,
        }
    }
}

impl AddOptions {
    /// Report `result` to the configured observer (if any) and pass it through.
    pub(crate) fn report<T>(
        &self,
        ctx: &TransformContext,
        result: FrameResult<T>,
        stats: impl FnOnce(&T) -> TransformStats,
    ) -> FrameResult<T> {
        if let Some(obs) = self.observer.as_ref() {
            match &result {
                Ok(out) => obs.on_success(ctx, stats(out)),
                Err(e) => {
                    let sev = e.severity();
                    obs.on_failure(ctx, sev, e);
                    if sev >= self.alert_at_or_above {
                        obs.on_alert(ctx, sev, e);
                    }
                }
            }
        }
        result
    }
}
