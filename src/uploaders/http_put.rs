use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use crate::core::{Transport, TransferProgress, UploadDestination, UploadError, VideoFile};
use super::progress_stream::ProgressStream;

/// 以 PUT 方式流式上传原始字节
///
/// 预签名地址自带授权，不附加额外头部。不设置客户端超时，超时由流水线的看门狗控制。
#[derive(Debug, Clone)]
pub struct HttpPutTransport {
    client: Client,
}

impl HttpPutTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpPutTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpPutTransport {
    #[tracing::instrument(skip_all, fields(file_name = %file.name, size = file.size))]
    async fn put(
        &self,
        destination: &UploadDestination,
        file: &VideoFile,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<(), UploadError> {
        let handle = File::open(&file.path)
            .await
            .map_err(|err| UploadError::network(format!("Failed to start upload: {}", err)))?;

        let stream = ProgressStream::new(ReaderStream::new(handle), file.size, progress);

        let request = self
            .client
            .put(&destination.upload_target_url)
            .header(CONTENT_TYPE, &file.mime_type)
            .header(CONTENT_LENGTH, file.size)
            .body(Body::wrap_stream(stream));

        tracing::debug!(target_url = %destination.upload_target_url, "Starting file upload");

        let response = request
            .send()
            .await
            .map_err(|err| UploadError::network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Upload rejected by target");
            return Err(UploadError::TransferHttpError(status.as_u16()));
        }

        Ok(())
    }
}
