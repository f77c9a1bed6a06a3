use std::time::Duration;

/// 元数据提取开始
pub const PROGRESS_PROBING: u8 = 5;
/// 元数据提取完成
pub const PROGRESS_PROBED: u8 = 15;
/// 上传地址已协商，传输阶段的起点
pub const PROGRESS_NEGOTIATED: u8 = 25;
/// 模拟上传的起点和步长
pub const MOCK_PROGRESS_START: u8 = 30;
pub const MOCK_PROGRESS_STEP: u8 = 10;

/// 传输阶段的进度映射到 25-100%
///
/// `total == 0` 时无法计算比例，返回 `None`。
pub fn transfer_percent(sent: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }

    let ratio = sent.min(total) as f64 / total as f64;
    let percent = PROGRESS_NEGOTIATED as f64 + (ratio * 75.0).round();
    Some(percent.clamp(PROGRESS_NEGOTIATED as f64, 100.0) as u8)
}

/// 模拟上传的进度序列：30, 40, ..., 100
pub fn mock_progress_steps() -> impl Iterator<Item = u8> {
    (MOCK_PROGRESS_START..=100).step_by(MOCK_PROGRESS_STEP as usize)
}

/// 格式化字节数
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const UNIT_SIZE: f64 = 1024.0;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= UNIT_SIZE && unit_index < UNITS.len() - 1 {
        size /= UNIT_SIZE;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// 格式化视频时长，例如 `1:05` 或 `1:02:03`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
