//! Orchestration: extraction pipeline, packer, manifest and events.

pub mod events;
pub mod extract;
pub mod manifest;
pub mod pack;

pub use events::{CancelToken, ChannelObserver, NullObserver, PipelineEvent, PipelineObserver};
pub use extract::ExtractionPipeline;
pub use manifest::ManifestBuilder;
pub use pack::Packer;
