pub mod config;
pub mod core;
pub mod negotiator;
pub mod probe;
pub mod store;
pub mod timeline;
pub mod uploaders;
pub mod utils;

// 重新导出核心类型
pub use crate::core::{
    ClearOutcome,
    PipelineConfig,
    UploadDestination,
    UploadError,
    UploadEvent,
    UploadId,
    UploadOutcome,
    UploadPipeline,
    UploadTask,
    VideoFile,
    VideoRecord,
    Result,
};

pub use negotiator::{HttpNegotiator, MockNegotiator};
pub use probe::FfmpegProbe;
pub use store::{JsonFileStore, MemoryStore};
pub use timeline::{BroadcastBus, TimelineCommand};
pub use uploaders::HttpPutTransport;
