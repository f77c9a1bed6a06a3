use async_trait::async_trait;
use tokio::sync::mpsc;
use super::errors::{BusError, NegotiationError, ProbeError, StoreError, UploadError};
use super::types::{UploadDestination, UploadId, VideoFile, VideoMetadata, VideoRecord};
use crate::timeline::TimelineCommand;

/// 视频元数据提取：时长、尺寸和预览帧
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    async fn probe(&self, file: &VideoFile) -> Result<VideoMetadata, ProbeError>;
}

/// 上传地址协商服务
#[async_trait]
pub trait DestinationNegotiator: Send + Sync {
    async fn negotiate(&self, file_name: &str) -> Result<UploadDestination, NegotiationError>;
}

/// 传输过程中的字节计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_sent: u64,
    pub bytes_total: u64,
}

/// 真实字节传输
///
/// 实现者通过 `progress` 上报已发送字节数；超时和取消由调用方负责。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn put(
        &self,
        destination: &UploadDestination,
        file: &VideoFile,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<(), UploadError>;
}

/// 视频记录存储，`list` 按插入顺序返回
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn add(&self, record: VideoRecord) -> Result<(), StoreError>;

    async fn remove(&self, id: UploadId) -> Result<Option<VideoRecord>, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<VideoRecord>, StoreError>;

    /// 清空记录并删除持久化缓存
    async fn purge(&self) -> Result<(), StoreError> {
        self.clear().await
    }
}

/// 时间线命令总线
pub trait TimelineBus: Send + Sync {
    fn emit(&self, command: TimelineCommand) -> Result<(), BusError>;
}

/// 破坏性操作前的用户确认
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// 总是确认
pub struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// 总是拒绝
pub struct AssumeNo;

#[async_trait]
impl Confirm for AssumeNo {
    async fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
