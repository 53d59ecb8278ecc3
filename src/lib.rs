//! `rust-dataframe` is an immutable, in-memory columnar table library.
//!
//! A [`frame::DataFrame`] is an ordered sequence of equally long, uniquely named
//! [`column::Column`]s. A column is one of three kinds:
//!
//! - **value** columns hold scalar [`types::Value`]s of a declared [`types::DataType`]
//! - **group** columns hold a nested record per row (one embedded table sharing the row count)
//! - **frame** columns hold an independent embedded table per row
//!
//! Tables are never mutated. Every transformation returns a new table that shares all unchanged
//! columns with its input, so a deep edit only rebuilds the groups along the path to it.
//!
//! ## Quick example: build, add, inspect the schema
//!
//! ```rust
//! use rust_dataframe::column::Column;
//! use rust_dataframe::frame::DataFrame;
//! use rust_dataframe::types::{BaseType, DataType, Value};
//!
//! let df = DataFrame::new(vec![
//!     Column::create_with_type_inference("name", vec![Value::from("a"), Value::from("b")], None)
//!         .unwrap(),
//!     Column::create_with_type_inference("age", vec![Value::Int64(10), Value::Null], None)
//!         .unwrap(),
//! ])
//! .unwrap();
//! assert_eq!(
//!     df.column("age").unwrap().data_type(),
//!     DataType::nullable(BaseType::Int64)
//! );
//!
//! let out = df.add("age2", |row| row.i64("age").map(|a| a * 2)).unwrap();
//! assert_eq!(out.column_count(), 3);
//! assert_eq!(df.column_count(), 2);
//!
//! let schema = out.schema();
//! assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["name", "age", "age2"]);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: runtime values and declared types
//! - [`inference`]: type inference modes and the widening lattice
//! - [`column`]: the three column kinds and their factories
//! - [`frame`]: the table type, row selection and vertical concatenation
//! - [`path`]: column paths and reference resolution
//! - [`row`]: row views handed to row expressions
//! - [`schema`]: type-only table mirrors and structural compatibility
//! - [`processing`]: the transformation algebra (`add` family, structural edits, grouping)
//! - [`execution`]: parallel group-scoped transformations with metrics
//! - [`observability`]: transformation outcome observers
//! - [`error`]: error types used across the crate

pub mod column;
pub mod error;
pub mod execution;
pub mod frame;
pub mod inference;
pub mod observability;
pub mod path;
pub mod processing;
pub mod row;
pub mod schema;
pub mod types;

pub use error::{FrameError, FrameResult};
