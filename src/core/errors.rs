use std::time::Duration;
use thiserror::Error;

/// 单个文件上传失败的原因
///
/// 除 `TooManyFiles` 外都只影响当前文件，批次中的其它文件照常处理。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Invalid file type '{mime_type}', please select a video file")]
    InvalidType { mime_type: String },

    #[error("File size {size} exceeds the limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to process video file: {0}")]
    MetadataExtractionFailed(String),

    #[error("Failed to prepare upload: {0}")]
    DestinationNegotiationFailed(String),

    #[error("Upload timed out after {0:?}")]
    TransferTimeout(Duration),

    #[error("Network error during upload: {0}")]
    TransferNetworkError(String),

    #[error("Upload was cancelled")]
    TransferAborted,

    #[error("Upload failed with status: {0}")]
    TransferHttpError(u16),

    #[error("Failed to save video: {0}")]
    StoreCommitFailed(String),

    #[error("Too many files in one batch: {count} (max {max})")]
    TooManyFiles { count: usize, max: usize },
}

impl UploadError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::TransferNetworkError(message.into())
    }

    /// 是否为单文件的终态错误（批次级错误返回 false）
    pub fn is_per_file(&self) -> bool {
        !matches!(self, Self::TooManyFiles { .. })
    }
}

/// 元数据提取错误
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },

    #[error("Malformed probe output: {0}")]
    Malformed(String),

    #[error("No video stream found")]
    NoVideoStream,
}

/// 上传地址协商错误
#[derive(Error, Debug)]
pub enum NegotiationError {
    #[error("HTTP error {0}")]
    Http(#[from] reqwest::Error),

    #[error("Negotiation service returned status {0}")]
    Status(u16),

    #[error("Negotiation service returned no destination for '{0}'")]
    Empty(String),
}

/// 视频记录存储错误
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Record {0} already exists")]
    Duplicate(String),
}

#[derive(Error, Debug)]
pub enum BusError {
    #[error("No timeline listener is attached")]
    NoListener,
}

pub type Result<T, E = UploadError> = std::result::Result<T, E>;
