// Reference store for tests and embedding hosts that keep records in memory.
// Creation order is the paging key.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::record::Record;
use super::store::{RecordStore, StoreError};
use crate::types::identifiers::{GroupId, RecordId};
use crate::types::progress::CategorySummary;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<Record>,
    index: HashMap<RecordId, usize>,
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in creation order.
    pub fn with_records(records: Vec<Record>) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn insert(&self, record: Record) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.index.contains_key(&record.id) {
            return Err(StoreError::Conflict(format!(
                "duplicate record id {}",
                record.id
            )));
        }
        let position = inner.records.len();
        inner.index.insert(record.id.clone(), position);
        inner.records.push(record);
        Ok(())
    }

    pub fn get(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let inner = self.read()?;
        Ok(inner.index.get(id).map(|&i| inner.records[i].clone()))
    }

    pub fn snapshot(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.read()?.records.clone())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Count persisted assignments; records without a code for a group are skipped.
    pub fn summary(
        &self,
        main_group: &GroupId,
        personality_group: &GroupId,
    ) -> Result<CategorySummary, StoreError> {
        let inner = self.read()?;
        let mut summary = CategorySummary::new();
        for record in &inner.records {
            if let Some(code) = &record.main_category {
                summary.record(main_group, code);
            }
            if let Some(code) = &record.personality_category {
                summary.record(personality_group, code);
            }
        }
        Ok(summary)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn count(&self) -> Result<usize, StoreError> {
        self.len()
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .records
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn commit(&self, records: &[Record]) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        // Resolve every position before touching anything so a bad id leaves
        // the store unchanged.
        let mut positions = Vec::with_capacity(records.len());
        for record in records {
            let position = inner.index.get(&record.id).copied().ok_or_else(|| {
                StoreError::Conflict(format!("record {} no longer exists", record.id))
            })?;
            positions.push(position);
        }

        for (record, position) in records.iter().zip(positions) {
            let stored = &mut inner.records[position];
            stored.main_category = record.main_category.clone();
            stored.personality_category = record.personality_category.clone();
        }
        Ok(())
    }
}
