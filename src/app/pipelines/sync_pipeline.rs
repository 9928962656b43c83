use crate::adapters::http::authority::AuthorityFetcher;
use crate::adapters::http::directory::DirectoryApi;
use crate::adapters::http::{build_http_client, ApiClient};
use crate::config::toml_config::SyncConfig;
use crate::core::applier::MutationApplier;
use crate::core::batch::{RateLimitPolicy, MAX_BATCH_SIZE};
use crate::core::reconcile::reconcile;
use crate::domain::model::{DomainSet, MutationStats, Session, SyncPlan, SyncSnapshot};
use crate::domain::ports::{ConfigProvider, Pipeline, Sleeper};
use crate::utils::error::Result;

/// 權威清單 → 目錄群組 的同步管道
pub struct DirectorySyncPipeline<C: ConfigProvider, S: Sleeper> {
    config: C,
    directory: DirectoryApi,
    authority: AuthorityFetcher,
    sleeper: S,
    policy: RateLimitPolicy,
    batch_size: usize,
    show_progress: bool,
}

impl<S: Sleeper> DirectorySyncPipeline<SyncConfig, S> {
    pub fn from_config(config: SyncConfig, sleeper: S) -> Result<Self> {
        let client = build_http_client(config.timeout())?;

        let directory = DirectoryApi::new(ApiClient::new(config.api_base_url(), client.clone()))
            .with_member_page_size(config.sync.page_size)
            .with_group_source(config.sync.group_source.clone());
        let authority = AuthorityFetcher::new(client, &config.sync.comment_marker)?;
        let policy = config.rate_limit_policy();
        let batch_size = config.sync.batch_size;

        Ok(Self::new(config, directory, authority, sleeper)
            .with_rate_limit_policy(policy)
            .with_batch_size(batch_size))
    }
}

impl<C: ConfigProvider, S: Sleeper> DirectorySyncPipeline<C, S> {
    pub fn new(config: C, directory: DirectoryApi, authority: AuthorityFetcher, sleeper: S) -> Self {
        Self {
            config,
            directory,
            authority,
            sleeper,
            policy: RateLimitPolicy::default(),
            batch_size: MAX_BATCH_SIZE,
            show_progress: true,
        }
    }

    pub fn with_rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

fn log_domains(label: &str, domains: &DomainSet) {
    tracing::info!("{} {} domains:", label, domains.len());
    if !domains.is_empty() {
        let listing: Vec<&str> = domains.iter().map(|d| d.as_str()).collect();
        tracing::info!("{}", listing.join("\n "));
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider, S: Sleeper> Pipeline for DirectorySyncPipeline<C, S> {
    async fn extract(&self) -> Result<SyncSnapshot> {
        let token = self
            .directory
            .authenticate(self.config.client_id(), self.config.client_secret())
            .await?;

        let authoritative = self.authority.fetch(self.config.domainbook_url()).await?;

        let group_id = self
            .directory
            .find_group(&token, self.config.group_query())
            .await?;

        let current = self.directory.list_members(&token, &group_id).await?;

        Ok(SyncSnapshot {
            session: Session { token, group_id },
            authoritative,
            current,
            excluded: self.config.excluded_domains(),
        })
    }

    async fn transform(&self, snapshot: SyncSnapshot) -> Result<SyncPlan> {
        let diff = reconcile(&snapshot.authoritative, &snapshot.current, &snapshot.excluded);

        log_domains("Removing", &diff.to_remove);
        log_domains("Adding", &diff.to_add);

        Ok(SyncPlan {
            session: snapshot.session,
            diff,
        })
    }

    async fn load(&self, plan: SyncPlan) -> Result<MutationStats> {
        let applier = MutationApplier::new(&self.directory, &self.sleeper)
            .with_policy(self.policy.clone())
            .with_batch_size(self.batch_size)
            .with_progress(self.show_progress);

        println!("Removing {} domains", plan.diff.to_remove.len());
        let removed = applier.remove_all(&plan.session, &plan.diff.to_remove).await?;

        println!("Adding {} domains", plan.diff.to_add.len());
        let added = applier.add_all(&plan.session, &plan.diff.to_add).await?;

        Ok(MutationStats { removed, ..added })
    }
}
