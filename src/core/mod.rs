pub mod applier;
pub mod batch;
pub mod engine;
pub mod reconcile;

pub use crate::domain::model::{DiffResult, DomainSet, SyncPlan, SyncReport, SyncSnapshot};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Sleeper};
pub use crate::utils::error::Result;
