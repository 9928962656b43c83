pub mod sync_pipeline;

pub use sync_pipeline::DirectorySyncPipeline;
