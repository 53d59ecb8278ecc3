use std::collections::HashMap;

use rust_dataframe::column::Column;
use rust_dataframe::frame::DataFrame;
use rust_dataframe::path::{ColumnPath, ColumnReference, ColumnResolutionContext};
use rust_dataframe::types::{ColumnKind, Value};

fn ints(name: &str, values: &[i64]) -> Column {
    Column::create_with_type_inference(
        name,
        values.iter().copied().map(Value::Int64).collect(),
        None,
    )
    .unwrap()
}

fn tree() -> DataFrame {
    let leaf = DataFrame::new(vec![ints("c", &[1, 2]), ints("d", &[3, 4])]).unwrap();
    let mid = DataFrame::new(vec![
        Column::create_column_group("b", leaf).into(),
        ints("e", &[5, 6]),
    ])
    .unwrap();
    let sub = DataFrame::new(vec![ints("s", &[7])]).unwrap();
    DataFrame::new(vec![
        Column::create_column_group("a", mid).into(),
        ints("f", &[8, 9]),
        Column::create_frame_column("frames", vec![sub.clone(), sub]).into(),
    ])
    .unwrap()
}

#[test]
fn every_schema_path_resolves_with_matching_kind() {
    let df = tree();
    let paths = df.schema().column_paths();
    assert_eq!(paths.len(), 7);
    for (path, kind) in paths {
        let found = df.resolve(&path).unwrap_or_else(|| panic!("{path} did not resolve"));
        assert_eq!(found.kind(), kind, "{path}");
        assert_eq!(found.path, path);
        assert_eq!(found.column.size(), df.row_count());
    }
}

#[test]
fn paths_are_values_resolved_per_table() {
    let path = ColumnPath::new(["a", "e"]);
    let df = tree();
    let renamed = df.rename(ColumnPath::new(["a", "e"]), "ee").unwrap();

    assert!(df.resolve(&path).is_some());
    assert!(renamed.resolve(&path).is_none());
    assert!(renamed.resolve(&ColumnPath::new(["a", "ee"])).is_some());
}

#[test]
fn structural_equality_and_hashing() {
    let mut seen = HashMap::new();
    seen.insert(ColumnPath::new(["a", "b", "c"]), 1);
    let rebuilt = ColumnPath::of("a").child("b").child("c");
    assert_eq!(seen.get(&rebuilt), Some(&1));
    assert_eq!(rebuilt.to_string(), "a.b.c");
    assert_eq!(ColumnPath::root().to_string(), "<root>");
}

#[test]
fn missing_segments_fail_to_resolve() {
    let df = tree();
    assert!(df.resolve(&ColumnPath::new(["a", "zz"])).is_none());
    assert!(df.resolve(&ColumnPath::new(["f", "x"])).is_none());
    // Frame columns are not walked through.
    assert!(df.resolve(&ColumnPath::new(["frames", "s"])).is_none());
}

#[test]
fn relative_resolution_below_a_resolved_column() {
    let df = tree();
    let a = df.get("a").unwrap();
    let c = a.resolve(&ColumnPath::new(["b", "c"])).unwrap();
    assert_eq!(c.path, ColumnPath::new(["a", "b", "c"]));
    assert_eq!(a.resolve(&ColumnPath::root()).unwrap().path, a.path);
}

#[test]
fn references_resolve_through_context() {
    let df = tree();
    let ctx = ColumnResolutionContext::new(&df);

    let by_name = "f".resolve_single(&ctx).unwrap();
    assert_eq!(by_name.kind(), ColumnKind::Value);

    let by_path = ColumnPath::new(["a", "b", "d"]).resolve_single(&ctx).unwrap();
    assert_eq!(by_path.name(), "d");
    assert_eq!(ColumnPath::new(["a", "b", "d"]).path(), by_path.path);

    let detached = ints("free", &[0, 0]);
    let itself = detached.resolve_single(&ctx).unwrap();
    assert!(Column::ptr_eq(&itself.column, &detached));

    assert!("missing".resolve_single(&ctx).is_none());
}

#[test]
fn indices_are_derived_from_size() {
    let df = tree();
    for c in df.columns() {
        assert_eq!(c.indices(), 0..c.size());
    }
    assert_eq!(df.indices(), 0..2);
}
