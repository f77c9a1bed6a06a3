use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use crate::core::{StoreError, UploadId, VideoRecord, VideoStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    videos: Vec<VideoRecord>,
}

/// 以 JSON 文件作为持久化缓存的视频记录存储
///
/// 每次修改后整体重写文件，先写临时文件再重命名。
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Vec<VideoRecord>>,
}

impl JsonFileStore {
    /// 打开存储，文件不存在时从空列表开始
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(data) => serde_json::from_slice::<StoreFile>(&data)?.videos,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(path = %path.display(), count = records.len(), "Video store loaded");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &[VideoRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(&StoreFile { videos: records.to_vec() })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl VideoStore for JsonFileStore {
    async fn add(&self, record: VideoRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }

        records.push(record);
        if let Err(err) = self.persist(&records).await {
            // 写盘失败时回滚内存状态
            records.pop();
            return Err(err);
        }
        Ok(())
    }

    async fn remove(&self, id: UploadId) -> Result<Option<VideoRecord>, StoreError> {
        let mut records = self.records.lock().await;
        let Some(index) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        // 写盘成功后才替换内存列表
        let mut remaining = records.clone();
        let removed = remaining.remove(index);
        self.persist(&remaining).await?;
        *records = remaining;
        Ok(Some(removed))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        self.persist(&[]).await?;
        records.clear();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<VideoRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn purge(&self) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        records.clear();
        Ok(())
    }
}
