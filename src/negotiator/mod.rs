//! 上传地址协商

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::{DestinationNegotiator, NegotiationError, UploadDestination, MOCK_SCHEME};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    file_names: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct PresignResponse {
    #[serde(default)]
    uploads: Vec<PresignedUpload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignedUpload {
    file_name: String,
    presigned_url: String,
    url: String,
    #[serde(default)]
    id: Option<String>,
}

/// 通过 HTTP 服务获取预签名上传地址
#[derive(Debug, Clone)]
pub struct HttpNegotiator {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpNegotiator {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

#[async_trait]
impl DestinationNegotiator for HttpNegotiator {
    async fn negotiate(&self, file_name: &str) -> Result<UploadDestination, NegotiationError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&PresignRequest { file_names: [file_name] });

        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(NegotiationError::Status(response.status().as_u16()));
        }

        let body: PresignResponse = response.json().await?;
        let upload = body
            .uploads
            .into_iter()
            .next()
            .ok_or_else(|| NegotiationError::Empty(file_name.to_string()))?;

        tracing::debug!(file_name = %upload.file_name, url = %upload.url, "Upload destination received");

        Ok(UploadDestination {
            upload_target_url: upload.presigned_url,
            final_url: upload.url,
            record_id: upload.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            record_name: upload.file_name,
        })
    }
}

/// 没有后端时使用的模拟协商器，返回 `mock://` 目标
#[derive(Debug, Clone, Default)]
pub struct MockNegotiator;

#[async_trait]
impl DestinationNegotiator for MockNegotiator {
    async fn negotiate(&self, file_name: &str) -> Result<UploadDestination, NegotiationError> {
        let record_id = Uuid::new_v4().to_string();

        Ok(UploadDestination {
            upload_target_url: format!("{}upload/{}", MOCK_SCHEME, record_id),
            final_url: format!("{}files/{}/{}", MOCK_SCHEME, record_id, file_name),
            record_name: file_name.to_string(),
            record_id,
        })
    }
}
