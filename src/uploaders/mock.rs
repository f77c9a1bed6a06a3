use std::time::Duration;
use tokio_util::sync::CancellationToken;
use crate::core::{Result, UploadError, VideoFile};
use crate::utils::mock_progress_steps;

/// 模拟上传：不走网络，直接引用本地文件
///
/// 每一步先等待 `step_delay` 再上报进度，返回最终地址。
/// `cancel` 触发后立即以 `TransferAborted` 结束。
pub async fn simulate_transfer<F>(
    file: &VideoFile,
    step_delay: Duration,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> Result<String>
where
    F: FnMut(u8),
{
    let final_url = file.local_url();
    tracing::info!(file_name = %file.name, final_url = %final_url, "Using mock upload with local file URL");

    for percent in mock_progress_steps() {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::warn!(file_name = %file.name, percent, "Mock upload aborted");
                return Err(UploadError::TransferAborted);
            }
            _ = tokio::time::sleep(step_delay) => {}
        }
        on_progress(percent);
    }

    Ok(final_url)
}
