//! Read snapshots and seed loading
//!
//! A [`ModelSnapshot`] is the plain-data form of a model: what an external persistence layer
//! hands over at session start and what renderers read. Loading a snapshot re-checks every
//! store invariant, so a seed with dangling references is rejected as a whole.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::layout::LayoutConfig;
use super::schema::{Measure, Relationship, Table};
use super::store::ModelStore;

/// Maximum accepted snapshot size (10 MB)
pub const MAX_SNAPSHOT_SIZE: usize = 10 * 1024 * 1024;

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelSnapshot {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

impl ModelSnapshot {
    /// Number of tables, relationships and measures
    pub fn element_count(&self) -> usize {
        self.tables.len() + self.relationships.len() + self.measures.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Serialization failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Snapshot is inconsistent: {0}")]
    Model(#[from] ModelError),
}

/// JSON encoding of snapshots
pub struct SnapshotCodec;

impl SnapshotCodec {
    pub fn encode(snapshot: &ModelSnapshot) -> Result<String, SnapshotError> {
        let json = serde_json::to_string_pretty(snapshot).map_err(SnapshotError::Encode)?;
        if json.len() > MAX_SNAPSHOT_SIZE {
            return Err(SnapshotError::TooLarge {
                size: json.len(),
                max: MAX_SNAPSHOT_SIZE,
            });
        }
        Ok(json)
    }

    pub fn decode(json: &str) -> Result<ModelSnapshot, SnapshotError> {
        if json.len() > MAX_SNAPSHOT_SIZE {
            return Err(SnapshotError::TooLarge {
                size: json.len(),
                max: MAX_SNAPSHOT_SIZE,
            });
        }
        serde_json::from_str(json).map_err(SnapshotError::Decode)
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<ModelSnapshot, SnapshotError> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > MAX_SNAPSHOT_SIZE as u64 {
            return Err(SnapshotError::TooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                max: MAX_SNAPSHOT_SIZE,
            });
        }
        let json = std::fs::read_to_string(path)?;
        Self::decode(&json)
    }
}

impl ModelStore {
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            tables: self.get_tables().into_iter().cloned().collect(),
            relationships: self.get_relationships().into_iter().cloned().collect(),
            measures: self.get_measures().to_vec(),
        }
    }

    /// Build a store from seed data. Tables go in first, then relationships, then measures;
    /// the first violated invariant aborts the whole load.
    pub fn from_snapshot(snapshot: ModelSnapshot, layout: LayoutConfig) -> Result<Self, ModelError> {
        let mut store = Self::with_layout(layout);
        let count = snapshot.element_count();

        for table in snapshot.tables {
            store.add_table(table)?;
        }
        for relationship in snapshot.relationships {
            store.add_relationship(relationship)?;
        }
        for measure in snapshot.measures {
            store.add_measure(measure)?;
        }

        tracing::info!("Loaded model snapshot with {} elements", count);
        Ok(store)
    }
}
