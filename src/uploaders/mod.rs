pub mod http_put;
pub mod mock;
mod progress_stream;

pub use http_put::HttpPutTransport;
pub use mock::simulate_transfer;
pub use progress_stream::ProgressStream;
