use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::frame::DataFrame;
use crate::schema::DataFrameSchema;

/// Column whose value per row is an independent embedded table.
///
/// The aggregate schema over all embedded tables is computed on first request and memoized.
/// Computing it is pure, so two racing first reads produce the same schema.
#[derive(Clone)]
pub struct FrameColumn {
    name: String,
    frames: Arc<[DataFrame]>,
    schema: Arc<LazySchema>,
}

struct LazySchema {
    cell: OnceLock<DataFrameSchema>,
    origin: SchemaOrigin,
}

enum SchemaOrigin {
    /// Union over all embedded tables.
    Cells,
    /// Supplied up front; `cell` is already set.
    Declared,
    /// Schema of the table the cells were split from.
    Source(DataFrame),
}

impl LazySchema {
    fn shared(cell: OnceLock<DataFrameSchema>, origin: SchemaOrigin) -> Arc<Self> {
        Arc::new(Self { cell, origin })
    }
}

impl FrameColumn {
    pub(crate) fn new(name: impl Into<String>, frames: Arc<[DataFrame]>) -> Self {
        Self {
            name: name.into(),
            frames,
            schema: LazySchema::shared(OnceLock::new(), SchemaOrigin::Cells),
        }
    }

    pub(crate) fn with_schema(
        name: impl Into<String>,
        frames: Arc<[DataFrame]>,
        schema: DataFrameSchema,
    ) -> Self {
        Self {
            name: name.into(),
            frames,
            schema: LazySchema::shared(OnceLock::from(schema), SchemaOrigin::Declared),
        }
    }

    pub(crate) fn with_schema_source(
        name: impl Into<String>,
        frames: Arc<[DataFrame]>,
        source: DataFrame,
    ) -> Self {
        Self {
            name: name.into(),
            frames,
            schema: LazySchema::shared(OnceLock::new(), SchemaOrigin::Source(source)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[DataFrame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&DataFrame> {
        self.frames.get(index)
    }

    /// Aggregate schema of the embedded tables.
    ///
    /// Divergent embedded schemas are unified with [`DataFrameSchema::union`].
    pub fn schema(&self) -> &DataFrameSchema {
        self.schema.cell.get_or_init(|| match &self.schema.origin {
            SchemaOrigin::Source(source) => source.schema(),
            SchemaOrigin::Cells | SchemaOrigin::Declared => {
                DataFrameSchema::union(self.frames.iter().map(DataFrame::schema))
            }
        })
    }

    /// Returns `true` once the aggregate schema has been computed.
    pub fn is_schema_computed(&self) -> bool {
        self.schema.cell.get().is_some()
    }

    /// Renaming keeps the embedded tables and the memoized schema.
    pub fn rename(&self, new_name: impl Into<String>) -> Self {
        Self {
            name: new_name.into(),
            frames: Arc::clone(&self.frames),
            schema: Arc::clone(&self.schema),
        }
    }

    /// Same name, different cells. A declared or source schema carries over; a union is
    /// recomputed for the new cells.
    pub(crate) fn with_frames(&self, frames: Vec<DataFrame>) -> Self {
        match self.schema.origin {
            SchemaOrigin::Cells => Self::new(self.name.clone(), frames.into()),
            SchemaOrigin::Declared | SchemaOrigin::Source(_) => Self {
                name: self.name.clone(),
                frames: frames.into(),
                schema: Arc::clone(&self.schema),
            },
        }
    }

    pub(crate) fn shares_frames_with(&self, other: &FrameColumn) -> bool {
        Arc::ptr_eq(&self.frames, &other.frames)
    }
}

impl PartialEq for FrameColumn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.frames == other.frames
    }
}

impl fmt::Debug for FrameColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameColumn")
            .field("name", &self.name)
            .field("frames", &self.frames)
            .finish()
    }
}
