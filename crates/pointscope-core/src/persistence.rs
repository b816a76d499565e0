//! External point-list buffer kept in step with the registry.

use crate::error::PersistenceError;
use crate::point::PointRecord;

/// Ordered list of records as they would be saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceBridge {
    records: Vec<PointRecord>,
}

impl PersistenceBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list (bulk load or scene replacement).
    pub fn replace_all(&mut self, records: Vec<PointRecord>) {
        self.records = records;
    }

    /// Overwrite the record stored under `old_id` in place.
    pub fn overwrite(&mut self, old_id: &str, record: PointRecord) -> Result<(), PersistenceError> {
        let Some(slot) = self.records.iter_mut().find(|r| r.id == old_id) else {
            log::warn!("Point list has no record for {}", old_id);
            return Err(PersistenceError::MissingRecord {
                id: old_id.to_string(),
            });
        };
        *slot = record;
        Ok(())
    }

    pub fn records(&self) -> &[PointRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pretty JSON in the point-list format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }
}
