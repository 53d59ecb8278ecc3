use crate::frame::DataFrame;

/// Column whose value per row is a nested record.
///
/// The nested records are stored as one embedded table with the same row count as the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGroup {
    name: String,
    frame: DataFrame,
}

impl ColumnGroup {
    pub(crate) fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.frame.row_count()
    }

    /// The embedded table holding the nested columns.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn rename(&self, new_name: impl Into<String>) -> Self {
        Self::new(new_name, self.frame.clone())
    }

    /// Same name, different embedded table.
    pub(crate) fn with_frame(&self, frame: DataFrame) -> Self {
        Self::new(self.name.clone(), frame)
    }
}
