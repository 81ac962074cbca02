//! Write-once, read-many record store keyed by document id.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use papermeta_common::{PapermetaError, Result};
use papermeta_ingestion::MetadataRecord;

/// Holds every record for the lifetime of the process. There is no
/// eviction; a restart loses all records.
#[derive(Debug, Default)]
pub struct MetadataStore {
    records: DashMap<String, Arc<MetadataRecord>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a finished record. Each id may be inserted once.
    pub fn insert(&self, record: MetadataRecord) -> Result<Arc<MetadataRecord>> {
        match self.records.entry(record.id().to_string()) {
            Entry::Occupied(e) => Err(PapermetaError::Duplicate(e.key().clone())),
            Entry::Vacant(slot) => {
                let record = Arc::new(record);
                slot.insert(Arc::clone(&record));
                tracing::debug!(id = record.id(), total = self.records.len(), "Record stored");
                Ok(record)
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<Arc<MetadataRecord>> {
        self.records
            .get(id)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| PapermetaError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
