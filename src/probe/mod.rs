//! 用 ffprobe/ffmpeg 读取视频时长、尺寸并截取预览帧

use std::path::Path;
use std::process::Stdio;
use async_trait::async_trait;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use tokio::process::Command;
use crate::core::{MetadataProbe, ProbeError, VideoFile, VideoMetadata};

/// 预览帧位置：1 秒与时长 10% 中较小者
pub fn preview_timestamp(duration_secs: f64) -> f64 {
    (duration_secs * 0.1).min(1.0).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
}

/// 解析 `ffprobe -print_format json` 的输出
pub fn parse_probe_output(stdout: &[u8]) -> Result<StreamInfo, ProbeError> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|err| ProbeError::Malformed(err.to_string()))?;

    let stream = probe_data["streams"]
        .get(0)
        .ok_or(ProbeError::NoVideoStream)?;

    // 部分容器只在 stream 上给出时长
    let duration_secs = probe_data["format"]["duration"]
        .as_str()
        .or_else(|| stream["duration"].as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ProbeError::Malformed("Could not parse duration".to_string()))?;

    let width = stream["width"]
        .as_u64()
        .ok_or_else(|| ProbeError::Malformed("Could not parse width".to_string()))? as u32;

    let height = stream["height"]
        .as_u64()
        .ok_or_else(|| ProbeError::Malformed("Could not parse height".to_string()))? as u32;

    Ok(StreamInfo { duration_secs, width, height })
}

/// 基于 ffprobe 和 ffmpeg 子进程的元数据提取
#[derive(Debug, Clone)]
pub struct FfmpegProbe {
    ffprobe_path: String,
    ffmpeg_path: String,
}

impl FfmpegProbe {
    pub fn new(ffprobe_path: impl Into<String>, ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    async fn probe_stream(&self, path: &Path) -> Result<StreamInfo, ProbeError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(ProbeError::ToolFailed {
                tool: "ffprobe",
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        parse_probe_output(&output.stdout)
    }

    /// 在指定时间点截取一帧，输出 JPEG 字节
    async fn grab_frame(&self, path: &Path, timestamp: f64) -> Result<Vec<u8>, ProbeError> {
        let seek = format!("{:.3}", timestamp);
        let output = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-ss", seek.as_str(), "-i"])
            .arg(path)
            .args(["-frames:v", "1", "-q:v", "4", "-f", "image2pipe", "-vcodec", "mjpeg", "pipe:1"])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(ProbeError::ToolFailed {
                tool: "ffmpeg",
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output.stdout)
    }
}

impl Default for FfmpegProbe {
    fn default() -> Self {
        Self::new("ffprobe", "ffmpeg")
    }
}

#[async_trait]
impl MetadataProbe for FfmpegProbe {
    #[tracing::instrument(skip_all, fields(file_name = %file.name))]
    async fn probe(&self, file: &VideoFile) -> Result<VideoMetadata, ProbeError> {
        let info = self.probe_stream(&file.path).await?;
        let frame = self.grab_frame(&file.path, preview_timestamp(info.duration_secs)).await?;

        tracing::debug!(
            duration = info.duration_secs,
            width = info.width,
            height = info.height,
            preview_bytes = frame.len(),
            "Video probe completed"
        );

        Ok(VideoMetadata {
            duration_ms: info.duration_secs * 1000.0,
            width: info.width,
            height: info.height,
            preview_image: format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(frame)),
        })
    }
}
