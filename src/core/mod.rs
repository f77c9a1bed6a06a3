mod errors;
mod pipeline;
mod tasks;
mod traits;
mod types;

pub use errors::{BusError, NegotiationError, ProbeError, Result, StoreError, UploadError};
pub use pipeline::{clear_all_prompt, clear_uploaded_prompt, UploadPipeline, UploadPipelineBuilder};
pub use tasks::ActiveTasks;
pub use traits::{
    AssumeNo, AssumeYes, Confirm, DestinationNegotiator, MetadataProbe, TimelineBus, TransferProgress,
    Transport, VideoStore,
};
pub use types::*;
