//! Row filtering for [`crate::frame::DataFrame`].

use crate::frame::DataFrame;
use crate::row::DataRow;

/// Returns a new [`DataFrame`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataFrame::filter_rows`].
pub fn filter<F>(df: &DataFrame, predicate: F) -> DataFrame
where
    F: FnMut(&DataRow<'_>) -> bool,
{
    df.filter_rows(predicate)
}

impl DataFrame {
    /// Keep the rows matching `predicate`, in their original order. Nested groups are filtered
    /// along with their parent rows.
    pub fn filter_rows<F>(&self, mut predicate: F) -> DataFrame
    where
        F: FnMut(&DataRow<'_>) -> bool,
    {
        let keep: Vec<usize> = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.index())
            .collect();
        self.select_rows(&keep)
    }
}
