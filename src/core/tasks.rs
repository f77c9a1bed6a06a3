use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use super::errors::UploadError;
use super::types::{UploadEvent, UploadId, UploadTask, VideoMetadata, VideoRecord};

/// 正在进行的上传任务集合
///
/// 多个批次可能同时修改集合，任务之间按 ID 隔离。锁不会跨越 `.await` 持有。
#[derive(Clone)]
pub struct ActiveTasks {
    /// 值中的序号用于保持插入顺序
    tasks: Arc<RwLock<HashMap<UploadId, (u64, UploadTask)>>>,
    next_seq: Arc<AtomicU64>,
    event_tx: broadcast::Sender<UploadEvent>,
}

impl ActiveTasks {
    pub fn new(event_tx: broadcast::Sender<UploadEvent>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            event_tx,
        }
    }

    fn publish(&self, event: UploadEvent) {
        // 没有订阅者时发送失败，忽略即可
        let _ = self.event_tx.send(event);
    }

    pub fn insert(&self, task: UploadTask) {
        let upload_id = task.id;
        let file_name = task.file_name.clone();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.tasks.write().insert(upload_id, (seq, task));
        self.publish(UploadEvent::TaskAdded { upload_id, file_name });
    }

    /// 更新进度，只接受不小于当前值的进度
    pub fn set_progress(&self, id: UploadId, percent: u8) -> bool {
        let percent = percent.min(100);
        let updated = {
            let mut tasks = self.tasks.write();
            match tasks.get_mut(&id) {
                Some((_, task)) if task.is_uploading && percent >= task.progress_percent => {
                    task.progress_percent = percent;
                    true
                }
                _ => false,
            }
        };

        if updated {
            self.publish(UploadEvent::Progress { upload_id: id, percent });
        } else {
            tracing::trace!(upload_id = %id, percent, "Ignored progress update");
        }
        updated
    }

    pub fn attach_metadata(&self, id: UploadId, metadata: &VideoMetadata) {
        if let Some((_, task)) = self.tasks.write().get_mut(&id) {
            task.preview_image = Some(metadata.preview_image.clone());
            task.duration_ms = Some(metadata.duration_ms);
            task.width = Some(metadata.width);
            task.height = Some(metadata.height);
        }
    }

    pub fn set_source_url(&self, id: UploadId, url: &str) {
        if let Some((_, task)) = self.tasks.write().get_mut(&id) {
            task.source_url = url.to_string();
        }
    }

    /// 标记失败：停止上传，进度归零
    pub fn mark_failed(&self, id: UploadId, error: &UploadError) {
        let changed = {
            let mut tasks = self.tasks.write();
            match tasks.get_mut(&id) {
                Some((_, task)) if task.is_uploading => {
                    task.is_uploading = false;
                    task.progress_percent = 0;
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.publish(UploadEvent::Failed {
                upload_id: id,
                error: error.clone(),
            });
        }
    }

    /// 上传成功：任务离开活动集合
    pub fn complete(&self, id: UploadId, record: &VideoRecord) {
        let removed = {
            let mut tasks = self.tasks.write();
            let uploading = tasks.get(&id).is_some_and(|(_, t)| t.is_uploading);
            uploading && tasks.remove(&id).is_some()
        };

        if removed {
            self.publish(UploadEvent::Completed {
                upload_id: id,
                record: record.clone(),
            });
            self.publish(UploadEvent::Removed { upload_id: id });
        }
    }

    pub fn remove(&self, id: UploadId) -> Option<UploadTask> {
        let task = self.tasks.write().remove(&id).map(|(_, task)| task);
        if task.is_some() {
            self.publish(UploadEvent::Removed { upload_id: id });
        }
        task
    }

    /// 延迟移除，计时器独立运行，不阻塞批次
    pub fn schedule_removal(&self, id: UploadId, delay: Duration) {
        let tasks = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tasks.remove(id).is_some() {
                tracing::debug!(upload_id = %id, "Removed failed upload after delay");
            }
        });
    }

    pub fn get(&self, id: UploadId) -> Option<UploadTask> {
        self.tasks.read().get(&id).map(|(_, task)| task.clone())
    }

    /// 按插入顺序排列的快照
    pub fn snapshot(&self) -> Vec<UploadTask> {
        let mut tasks: Vec<_> = self.tasks.read().values().cloned().collect();
        tasks.sort_by_key(|(seq, _)| *seq);
        tasks.into_iter().map(|(_, task)| task).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// 移除所有已结束（失败待清理）的任务，仍在上传的保留
    pub fn clear_finished(&self) -> usize {
        let ids: Vec<_> = {
            let mut tasks = self.tasks.write();
            let finished: Vec<_> = tasks
                .iter()
                .filter(|(_, (_, task))| !task.is_uploading)
                .map(|(id, _)| *id)
                .collect();
            for id in &finished {
                tasks.remove(id);
            }
            finished
        };
        for upload_id in &ids {
            self.publish(UploadEvent::Removed { upload_id: *upload_id });
        }
        ids.len()
    }
}
