use crate::domain::model::{DomainSet, MutationStats, SyncPlan, SyncSnapshot};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn domainbook_url(&self) -> &str;
    /// 已補上 scheme 的 API 根網址
    fn api_base_url(&self) -> String;
    fn client_id(&self) -> &str;
    fn client_secret(&self) -> &str;
    fn group_query(&self) -> &str;
    fn excluded_domains(&self) -> DomainSet;
}

/// 退避等待的抽象，測試可替換為記錄用的實作
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SyncSnapshot>;
    async fn transform(&self, snapshot: SyncSnapshot) -> Result<SyncPlan>;
    async fn load(&self, plan: SyncPlan) -> Result<MutationStats>;
}
