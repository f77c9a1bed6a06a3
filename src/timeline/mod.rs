//! 发往编辑器时间线的「添加视频」命令

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;
use crate::core::{BusError, TimelineBus, VideoRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItemMetadata {
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddVideoPayload {
    /// 每次加入时间线都生成新的 ID
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub details: VideoDetails,
    pub metadata: VideoItemMetadata,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVideoOptions {
    pub resource_id: String,
    pub scale_mode: String,
}

impl Default for AddVideoOptions {
    fn default() -> Self {
        Self {
            resource_id: "main".to_string(),
            scale_mode: "fit".to_string(),
        }
    }
}

/// 时间线命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineCommand {
    AddVideo {
        payload: AddVideoPayload,
        options: AddVideoOptions,
    },
}

impl TimelineCommand {
    pub fn add_video(record: &VideoRecord) -> Self {
        Self::AddVideo {
            payload: AddVideoPayload {
                id: Uuid::new_v4().simple().to_string(),
                kind: "video".to_string(),
                details: VideoDetails {
                    src: record.source_url.clone(),
                },
                metadata: VideoItemMetadata {
                    preview_url: record.preview_image.clone(),
                },
                duration: record.duration_ms,
            },
            options: AddVideoOptions::default(),
        }
    }
}

/// 基于 broadcast 通道的命令总线
#[derive(Debug, Clone)]
pub struct BroadcastBus {
    tx: broadcast::Sender<TimelineCommand>,
}

impl BroadcastBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimelineCommand> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TimelineBus for BroadcastBus {
    fn emit(&self, command: TimelineCommand) -> Result<(), BusError> {
        self.tx.send(command).map(|_| ()).map_err(|_| BusError::NoListener)
    }
}
