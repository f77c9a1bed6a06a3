use async_trait::async_trait;
use parking_lot::RwLock;
use crate::core::{StoreError, UploadId, VideoRecord, VideoStore};

/// 进程内的视频记录存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<VideoRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn add(&self, record: VideoRecord) -> Result<(), StoreError> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }
        records.push(record);
        Ok(())
    }

    async fn remove(&self, id: UploadId) -> Result<Option<VideoRecord>, StoreError> {
        let mut records = self.records.write();
        let removed = records
            .iter()
            .position(|r| r.id == id)
            .map(|index| records.remove(index));
        Ok(removed)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.records.write().clear();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<VideoRecord>, StoreError> {
        Ok(self.records.read().clone())
    }
}
