//! Column addressing.
//!
//! A [`ColumnPath`] is an ordered list of names that descends through column groups. Paths are
//! plain values: equality and hashing are structural, and resolving a path re-walks it against
//! whatever table is supplied, so one path can be resolved against many tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::frame::DataFrame;
use crate::types::ColumnKind;

/// Ordered sequence of column names locating a column through nested groups.
///
/// The empty path denotes "this column itself" at its own attachment point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnPath(Vec<String>);

impl ColumnPath {
    /// Build a path from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The empty path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Single-segment path.
    pub fn of(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// All but the last segment; `None` for the empty path.
    pub fn parent(&self) -> Option<ColumnPath> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// This path extended by one segment.
    pub fn child(&self, name: impl Into<String>) -> ColumnPath {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    pub fn starts_with(&self, prefix: &ColumnPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for ColumnPath {
    fn from(name: &str) -> Self {
        Self::of(name)
    }
}

impl From<String> for ColumnPath {
    fn from(name: String) -> Self {
        Self::of(name)
    }
}

impl From<&ColumnPath> for ColumnPath {
    fn from(path: &ColumnPath) -> Self {
        path.clone()
    }
}

impl From<Vec<String>> for ColumnPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl<const N: usize> From<[&str; N]> for ColumnPath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

/// A resolved column together with the full path it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWithPath {
    /// The resolved column.
    pub column: Column,
    /// Full path from the table root.
    pub path: ColumnPath,
}

impl ColumnWithPath {
    pub fn name(&self) -> &str {
        self.column.name()
    }

    pub fn kind(&self) -> ColumnKind {
        self.column.kind()
    }

    /// Resolve `relative` below this column. The empty path returns this column itself.
    pub fn resolve(&self, relative: &ColumnPath) -> Option<ColumnWithPath> {
        let mut column = &self.column;
        let mut path = self.path.clone();
        for segment in relative.segments() {
            column = column.as_group()?.frame().column(segment)?;
            path = path.child(segment.as_str());
        }
        Some(ColumnWithPath {
            column: column.clone(),
            path,
        })
    }
}

/// The table a column reference is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct ColumnResolutionContext<'a> {
    df: &'a DataFrame,
}

impl<'a> ColumnResolutionContext<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    pub fn df(&self) -> &'a DataFrame {
        self.df
    }
}

/// Anything that can be resolved to a single column of a table.
pub trait ColumnReference {
    /// Name the resolved column will carry.
    fn name(&self) -> &str;

    /// Resolve against `context`, or `None` if any segment is missing.
    fn resolve_single(&self, context: &ColumnResolutionContext<'_>) -> Option<ColumnWithPath>;

    /// Path this reference points at, used in error reports.
    fn path(&self) -> ColumnPath {
        ColumnPath::of(self.name())
    }
}

impl ColumnReference for ColumnPath {
    fn name(&self) -> &str {
        ColumnPath::name(self).unwrap_or("")
    }

    fn resolve_single(&self, context: &ColumnResolutionContext<'_>) -> Option<ColumnWithPath> {
        context.df().resolve(self)
    }

    fn path(&self) -> ColumnPath {
        self.clone()
    }
}

impl ColumnReference for str {
    fn name(&self) -> &str {
        self
    }

    fn resolve_single(&self, context: &ColumnResolutionContext<'_>) -> Option<ColumnWithPath> {
        let column = context.df().column(self)?;
        Some(ColumnWithPath {
            column: column.clone(),
            path: ColumnPath::of(self),
        })
    }
}

impl ColumnReference for String {
    fn name(&self) -> &str {
        self
    }

    fn resolve_single(&self, context: &ColumnResolutionContext<'_>) -> Option<ColumnWithPath> {
        self.as_str().resolve_single(context)
    }
}

/// A column resolves to itself, attached at its own name.
impl ColumnReference for Column {
    fn name(&self) -> &str {
        Column::name(self)
    }

    fn resolve_single(&self, _context: &ColumnResolutionContext<'_>) -> Option<ColumnWithPath> {
        Some(ColumnWithPath {
            column: self.clone(),
            path: ColumnPath::of(Column::name(self)),
        })
    }
}

impl<T: ColumnReference + ?Sized> ColumnReference for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve_single(&self, context: &ColumnResolutionContext<'_>) -> Option<ColumnWithPath> {
        (**self).resolve_single(context)
    }

    fn path(&self) -> ColumnPath {
        (**self).path()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::ColumnPath;

    #[test]
    fn equality_and_hashing_are_structural() {
        let a = ColumnPath::new(["g", "y"]);
        let b = ColumnPath::from(["g", "y"]);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn parent_and_child() {
        let p = ColumnPath::new(["a", "b", "c"]);
        assert_eq!(p.name(), Some("c"));
        assert_eq!(p.parent(), Some(ColumnPath::new(["a", "b"])));
        assert_eq!(ColumnPath::new(["a", "b"]).child("c"), p);
        assert_eq!(ColumnPath::root().parent(), None);
        assert!(p.starts_with(&ColumnPath::of("a")));
    }

    #[test]
    fn display_joins_segments() {
        assert_eq!(ColumnPath::new(["a", "b"]).to_string(), "a.b");
        assert_eq!(ColumnPath::root().to_string(), "<root>");
    }
}
