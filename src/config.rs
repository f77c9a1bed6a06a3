use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use serde::Deserialize;
use crate::core::{DestinationNegotiator, PipelineConfig};
use crate::negotiator::{HttpNegotiator, MockNegotiator};

pub const DEFAULT_CONFIG_FILE: &str = "reelbin.toml";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// 未配置时使用模拟上传
    pub negotiation_endpoint: Option<String>,
    pub auth_token: Option<String>,
    /// 已上传视频的持久化缓存
    pub store_path: PathBuf,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            negotiation_endpoint: None,
            auth_token: None,
            store_path: PathBuf::from("videos-storage.json"),
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> anyhow::Result<Config> {
        toml::from_str(source).context("Can't parse config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Can't read config file {}", path.display()))?;
        Self::from_toml(&source)
    }

    /// 默认配置文件不存在时使用默认值
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(Path::new(DEFAULT_CONFIG_FILE)),
            None => Ok(Config::default()),
        }
    }

    pub fn negotiator(&self) -> Arc<dyn DestinationNegotiator> {
        match &self.negotiation_endpoint {
            Some(endpoint) => {
                let mut negotiator = HttpNegotiator::new(endpoint);
                if let Some(token) = &self.auth_token {
                    negotiator = negotiator.with_auth_token(token);
                }
                Arc::new(negotiator)
            }
            None => Arc::new(MockNegotiator),
        }
    }
}
