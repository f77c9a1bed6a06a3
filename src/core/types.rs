use std::path::{Path, PathBuf};
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;
use super::errors::UploadError;

/// 单文件大小上限 100 MiB
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// 每批最多文件数
pub const MAX_FILES_PER_BATCH: usize = 5;

/// 上传组件接受的扩展名
pub const ACCEPTED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// 模拟上传目标的 scheme 前缀
pub const MOCK_SCHEME: &str = "mock://";

// 用于序列化 Duration
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

/// 上传任务唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UploadId(pub Uuid);

impl UploadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UploadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 待上传的本地文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub path: PathBuf,
}

impl VideoFile {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            mime_type: mime_type.into(),
            size,
            path,
        }
    }

    /// 从磁盘读取文件大小，并按扩展名推断 MIME 类型
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = tokio::fs::canonicalize(path.as_ref()).await?;
        let meta = tokio::fs::metadata(&path).await?;
        let mime = mime_from_extension(&path);

        Ok(Self::new(path, mime, meta.len()))
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    pub fn has_accepted_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
    }

    /// 指向本地文件内容的引用，模拟上传时作为最终地址
    pub fn local_url(&self) -> String {
        Url::from_file_path(&self.path)
            .map(String::from)
            .unwrap_or_else(|_| format!("file://{}", self.path.display()))
    }
}

pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// 从视频中提取的元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration_ms: f64,
    pub width: u32,
    pub height: u32,
    /// `data:image/jpeg;base64,...`
    pub preview_image: String,
}

/// 正在上传的任务
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadTask {
    pub id: UploadId,
    pub file_name: String,
    /// 上传成功前为空
    pub source_url: String,
    pub preview_image: Option<String>,
    pub duration_ms: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub is_uploading: bool,
    pub progress_percent: u8,
    pub created_at: DateTime<Utc>,
}

impl UploadTask {
    pub fn new(id: UploadId, file_name: impl Into<String>) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            source_url: String::new(),
            preview_image: None,
            duration_ms: None,
            width: None,
            height: None,
            is_uploading: true,
            progress_percent: 0,
            created_at: Utc::now(),
        }
    }

    /// 失败后进入错误展示状态
    pub fn is_failed(&self) -> bool {
        !self.is_uploading && self.progress_percent == 0
    }
}

/// 上传完成后持久化的视频记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: UploadId,
    pub source_url: String,
    pub preview_image: String,
    pub duration_ms: f64,
    pub file_name: String,
}

/// 协商得到的上传目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDestination {
    pub upload_target_url: String,
    pub final_url: String,
    pub record_name: String,
    pub record_id: String,
}

impl UploadDestination {
    pub fn is_mock(&self) -> bool {
        self.upload_target_url.starts_with(MOCK_SCHEME)
    }
}

/// 上传事件
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// 任务已加入活动集合
    TaskAdded {
        upload_id: UploadId,
        file_name: String,
    },
    /// 进度更新
    Progress {
        upload_id: UploadId,
        percent: u8,
    },
    /// 任务完成
    Completed {
        upload_id: UploadId,
        record: VideoRecord,
    },
    /// 任务失败
    Failed {
        upload_id: UploadId,
        error: UploadError,
    },
    /// 任务已从活动集合移除
    Removed {
        upload_id: UploadId,
    },
}

/// 单个文件的最终结果
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Completed(VideoRecord),
    Failed {
        upload_id: UploadId,
        file_name: String,
        error: UploadError,
    },
}

impl UploadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn error(&self) -> Option<&UploadError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// 清理操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// 没有可清理的记录，未询问用户
    NothingToClear,
    /// 用户取消
    Declined,
    /// 已清理的记录数
    Cleared(usize),
}

/// 上传流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_file_size: u64,
    pub max_files_per_batch: usize,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub transfer_timeout: Duration,
    /// 失败任务在活动集合中的保留时间
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub failure_cleanup_delay: Duration,
    /// 模拟上传每一步的间隔
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub mock_step_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_files_per_batch: MAX_FILES_PER_BATCH,
            transfer_timeout: Duration::from_secs(5 * 60),
            failure_cleanup_delay: Duration::from_secs(5),
            mock_step_delay: Duration::from_millis(100),
        }
    }
}

// 静态断言确保类型是 Send 的
const _: () = {
    fn assert_send<T: Send>() {}
    fn assert_types() {
        assert_send::<UploadTask>();
        assert_send::<UploadEvent>();
        assert_send::<VideoRecord>();
    }
};
