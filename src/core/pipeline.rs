use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use crate::negotiator::MockNegotiator;
use crate::probe::FfmpegProbe;
use crate::store::MemoryStore;
use crate::timeline::{BroadcastBus, TimelineCommand};
use crate::uploaders::{simulate_transfer, HttpPutTransport};
use crate::utils::format_bytes;
use crate::utils::progress::{transfer_percent, PROGRESS_NEGOTIATED, PROGRESS_PROBED, PROGRESS_PROBING};
use super::errors::{Result, StoreError, UploadError};
use super::tasks::ActiveTasks;
use super::traits::{
    Confirm, DestinationNegotiator, MetadataProbe, TimelineBus, TransferProgress, Transport, VideoStore,
};
use super::types::{
    ClearOutcome, PipelineConfig, UploadDestination, UploadEvent, UploadId, UploadOutcome, UploadTask,
    VideoFile, VideoRecord,
};

pub fn clear_uploaded_prompt(count: usize) -> String {
    format!(
        "Are you sure you want to clear all {} uploaded video{}? This action cannot be undone.",
        count,
        if count > 1 { "s" } else { "" }
    )
}

pub fn clear_all_prompt(count: usize) -> String {
    format!(
        "Are you sure you want to permanently delete all uploaded videos and clear all video data? This will:\n\n\
         \u{2022} Remove all {} uploaded videos\n\
         \u{2022} Clear video storage data\n\
         \u{2022} This action cannot be undone",
        count
    )
}

/// 视频上传流水线
///
/// 同一批次内的文件按顺序逐个处理；不同批次可以交错执行。
/// 任何失败都只终止当前文件，不重试。
pub struct UploadPipeline {
    config: PipelineConfig,
    probe: Arc<dyn MetadataProbe>,
    negotiator: Arc<dyn DestinationNegotiator>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn VideoStore>,
    bus: Arc<dyn TimelineBus>,
    tasks: ActiveTasks,
    event_tx: broadcast::Sender<UploadEvent>,
    shutdown: CancellationToken,
}

impl UploadPipeline {
    pub fn builder() -> UploadPipelineBuilder {
        UploadPipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 订阅任务事件
    ///
    /// 接收速度跟不上时会丢失事件（lagged）。
    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.event_tx.subscribe()
    }

    /// 当前活动任务（含失败后等待移除的任务）
    pub fn active_tasks(&self) -> Vec<UploadTask> {
        self.tasks.snapshot()
    }

    /// 手动移除一个活动任务（上传中或失败待清理）
    ///
    /// 已安排的延迟移除随后不会再产生事件。上传中的任务被移除后，
    /// 传输本身仍会继续并写入存储。
    pub fn dismiss_task(&self, id: UploadId) -> Option<UploadTask> {
        let task = self.tasks.remove(id);
        if task.is_some() {
            tracing::debug!(upload_id = %id, "Upload task dismissed");
        }
        task
    }

    pub async fn uploaded_videos(&self) -> Result<Vec<VideoRecord>, StoreError> {
        self.store.list().await
    }

    /// 上传一批文件
    ///
    /// 文件数超过上限时整批拒绝；否则每个文件都得到一个终态结果。
    pub async fn submit(&self, files: Vec<VideoFile>) -> Result<Vec<UploadOutcome>> {
        if files.len() > self.config.max_files_per_batch {
            tracing::warn!(count = files.len(), max = self.config.max_files_per_batch, "Batch rejected");
            return Err(UploadError::TooManyFiles {
                count: files.len(),
                max: self.config.max_files_per_batch,
            });
        }

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.process_file(file).await);
        }
        Ok(outcomes)
    }

    async fn process_file(&self, file: VideoFile) -> UploadOutcome {
        let upload_id = UploadId::new();
        self.tasks.insert(UploadTask::new(upload_id, &file.name));

        tracing::info!(
            upload_id = %upload_id,
            file_name = %file.name,
            size = %format_bytes(file.size),
            mime_type = %file.mime_type,
            "Starting upload"
        );

        match self.run(upload_id, &file).await {
            Ok(record) => {
                self.tasks.complete(upload_id, &record);
                tracing::info!(upload_id = %upload_id, source_url = %record.source_url, "Video added to store");
                UploadOutcome::Completed(record)
            }
            Err(error) => {
                tracing::error!(upload_id = %upload_id, file_name = %file.name, error = %error, "Upload failed");
                self.tasks.mark_failed(upload_id, &error);
                self.tasks.schedule_removal(upload_id, self.config.failure_cleanup_delay);
                UploadOutcome::Failed {
                    upload_id,
                    file_name: file.name,
                    error,
                }
            }
        }
    }

    async fn run(&self, upload_id: UploadId, file: &VideoFile) -> Result<VideoRecord> {
        self.validate(file)?;

        self.tasks.set_progress(upload_id, PROGRESS_PROBING);
        let metadata = self
            .probe
            .probe(file)
            .await
            .map_err(|err| UploadError::MetadataExtractionFailed(err.to_string()))?;

        self.tasks.attach_metadata(upload_id, &metadata);
        self.tasks.set_progress(upload_id, PROGRESS_PROBED);

        let destination = self
            .negotiator
            .negotiate(&file.name)
            .await
            .map_err(|err| UploadError::DestinationNegotiationFailed(err.to_string()))?;
        self.tasks.set_progress(upload_id, PROGRESS_NEGOTIATED);

        let source_url = if destination.is_mock() {
            simulate_transfer(file, self.config.mock_step_delay, &self.shutdown, |percent| {
                self.tasks.set_progress(upload_id, percent);
            })
            .await?
        } else {
            self.transfer(upload_id, &destination, file).await?;
            destination.final_url.clone()
        };
        self.tasks.set_source_url(upload_id, &source_url);

        let record = VideoRecord {
            id: upload_id,
            source_url,
            preview_image: metadata.preview_image,
            duration_ms: metadata.duration_ms,
            file_name: file.name.clone(),
        };

        self.store
            .add(record.clone())
            .await
            .map_err(|err| UploadError::StoreCommitFailed(err.to_string()))?;

        Ok(record)
    }

    fn validate(&self, file: &VideoFile) -> Result<()> {
        if !file.mime_type.starts_with("video/") {
            return Err(UploadError::InvalidType {
                mime_type: file.mime_type.clone(),
            });
        }

        if file.size > self.config.max_file_size {
            return Err(UploadError::TooLarge {
                size: file.size,
                limit: self.config.max_file_size,
            });
        }

        Ok(())
    }

    /// 真实传输，带超时看门狗和关闭信号
    async fn transfer(&self, upload_id: UploadId, destination: &UploadDestination, file: &VideoFile) -> Result<()> {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let transfer = self.transport.put(destination, file, progress_tx);
        tokio::pin!(transfer);

        let watchdog = tokio::time::sleep(self.config.transfer_timeout);
        tokio::pin!(watchdog);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    return Err(UploadError::TransferAborted);
                }
                _ = &mut watchdog => {
                    tracing::warn!(upload_id = %upload_id, timeout = ?self.config.transfer_timeout, "Upload timed out, aborting");
                    return Err(UploadError::TransferTimeout(self.config.transfer_timeout));
                }
                Some(progress) = progress_rx.recv() => {
                    self.apply_transfer_progress(upload_id, progress);
                }
                result = &mut transfer => {
                    while let Ok(progress) = progress_rx.try_recv() {
                        self.apply_transfer_progress(upload_id, progress);
                    }
                    return result;
                }
            }
        }
    }

    fn apply_transfer_progress(&self, upload_id: UploadId, progress: TransferProgress) {
        if let Some(percent) = transfer_percent(progress.bytes_sent, progress.bytes_total) {
            self.tasks.set_progress(upload_id, percent);
        }
    }

    /// 把视频加入时间线，失败只记录日志
    pub fn promote_to_timeline(&self, record: &VideoRecord) {
        if let Err(err) = self.bus.emit(TimelineCommand::add_video(record)) {
            tracing::error!(record_id = %record.id, error = %err, "Error adding video to timeline");
        }
    }

    pub async fn remove_uploaded(&self, id: UploadId) -> Result<Option<VideoRecord>, StoreError> {
        let removed = self.store.remove(id).await?;
        if removed.is_some() {
            tracing::info!(record_id = %id, "Uploaded video removed");
        }
        Ok(removed)
    }

    /// 确认后清空已上传的视频
    pub async fn clear_uploaded(&self, confirm: &dyn Confirm) -> Result<ClearOutcome, StoreError> {
        let count = self.store.list().await?.len();
        if count == 0 {
            return Ok(ClearOutcome::NothingToClear);
        }

        if !confirm.confirm(&clear_uploaded_prompt(count)).await {
            return Ok(ClearOutcome::Declined);
        }

        self.store.clear().await?;
        tracing::info!(count, "Uploaded videos cleared");
        Ok(ClearOutcome::Cleared(count))
    }

    /// 确认后清空全部视频数据：记录、持久化缓存和活动任务
    pub async fn clear_all_data(&self, confirm: &dyn Confirm) -> Result<ClearOutcome, StoreError> {
        let count = self.store.list().await?.len();
        if count == 0 {
            return Ok(ClearOutcome::NothingToClear);
        }

        if !confirm.confirm(&clear_all_prompt(count)).await {
            return Ok(ClearOutcome::Declined);
        }

        self.store.purge().await?;
        // 进行中的上传不受影响，完成后照常写入存储
        let dropped = self.tasks.clear_finished();
        tracing::info!(count, dropped_tasks = dropped, "All video data cleared");
        Ok(ClearOutcome::Cleared(count))
    }

    /// 中止所有进行中的传输
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[derive(Default)]
pub struct UploadPipelineBuilder {
    config: Option<PipelineConfig>,
    probe: Option<Arc<dyn MetadataProbe>>,
    negotiator: Option<Arc<dyn DestinationNegotiator>>,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn VideoStore>>,
    bus: Option<Arc<dyn TimelineBus>>,
}

impl UploadPipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn MetadataProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn negotiator(mut self, negotiator: Arc<dyn DestinationNegotiator>) -> Self {
        self.negotiator = Some(negotiator);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(mut self, store: Arc<dyn VideoStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn bus(mut self, bus: Arc<dyn TimelineBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// 未指定的协作者使用默认实现：模拟协商、内存存储
    pub fn build(self) -> UploadPipeline {
        // 最大缓存 256 个事件
        let (event_tx, _) = broadcast::channel(256);

        UploadPipeline {
            config: self.config.unwrap_or_default(),
            probe: self.probe.unwrap_or_else(|| Arc::new(FfmpegProbe::default())),
            negotiator: self.negotiator.unwrap_or_else(|| Arc::new(MockNegotiator)),
            transport: self.transport.unwrap_or_else(|| Arc::new(HttpPutTransport::new())),
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            bus: self.bus.unwrap_or_else(|| Arc::new(BroadcastBus::default())),
            tasks: ActiveTasks::new(event_tx.clone()),
            event_tx,
            shutdown: CancellationToken::new(),
        }
    }
}
