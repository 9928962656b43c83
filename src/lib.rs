pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::clock::TokioSleeper;
pub use app::pipelines::DirectorySyncPipeline;
pub use config::{toml_config::SyncConfig, CliArgs};
pub use crate::core::{engine::SyncEngine, reconcile::reconcile};
pub use utils::error::{Result, SyncError};
