pub mod progress;

pub use progress::{format_bytes, format_duration, mock_progress_steps, transfer_percent};
