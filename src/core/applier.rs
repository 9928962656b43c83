use crate::adapters::http::directory::{BatchOutcome, DirectoryApi};
use crate::core::batch::{split_into_batches, RateLimitPolicy, MAX_BATCH_SIZE};
use crate::domain::model::{Domain, DomainSet, MutationStats, Session};
use crate::domain::ports::Sleeper;
use crate::utils::error::{Result, SyncError};
use std::io::Write;
use std::sync::Mutex;

type ProgressWriter<'a> = Mutex<Box<dyn Write + Send + 'a>>;

/// 依序套用 remove / add，任何非 429 的失敗都會立即中止
pub struct MutationApplier<'a, S: Sleeper> {
    api: &'a DirectoryApi,
    sleeper: &'a S,
    policy: RateLimitPolicy,
    batch_size: usize,
    progress: Option<ProgressWriter<'a>>,
}

impl<'a, S: Sleeper> MutationApplier<'a, S> {
    pub fn new(api: &'a DirectoryApi, sleeper: &'a S) -> Self {
        Self {
            api,
            sleeper,
            policy: RateLimitPolicy::default(),
            batch_size: MAX_BATCH_SIZE,
            progress: Some(Mutex::new(Box::new(std::io::stdout()))),
        }
    }

    pub fn with_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// true = 進度輸出到 stdout，false = 不輸出
    pub fn with_progress(self, show_progress: bool) -> Self {
        if show_progress {
            self.with_progress_writer(std::io::stdout())
        } else {
            Self {
                progress: None,
                ..self
            }
        }
    }

    pub fn with_progress_writer(mut self, writer: impl Write + Send + 'a) -> Self {
        self.progress = Some(Mutex::new(Box::new(writer)));
        self
    }

    /// 每個網域一個請求；已完成的移除不會回滾
    #[tracing::instrument(name = "remove", skip_all, fields(count = domains.len()))]
    pub async fn remove_all(&self, session: &Session, domains: &DomainSet) -> Result<usize> {
        let mut removed = 0;
        for domain in domains {
            self.api
                .remove_member(&session.token, &session.group_id, domain)
                .await?;
            removed += 1;
        }
        Ok(removed)
    }

    #[tracing::instrument(name = "add", skip_all, fields(count = domains.len()))]
    pub async fn add_all(&self, session: &Session, domains: &DomainSet) -> Result<MutationStats> {
        let total = domains.len();
        let mut stats = MutationStats::default();
        let mut queued = 0;

        for (index, batch) in split_into_batches(domains, self.batch_size)
            .into_iter()
            .enumerate()
        {
            for domain in &batch {
                queued += 1;
                self.report_progress(queued, total, domain);
            }

            let mut attempt: u32 = 0;
            loop {
                stats.batches_submitted += 1;
                let outcome = self
                    .api
                    .submit_batch(&session.token, &session.group_id, &batch)
                    .await?;

                match outcome {
                    BatchOutcome::Accepted => {
                        tracing::debug!("Successfully added {} domains", queued);
                        stats.added += batch.len();
                        break;
                    }
                    BatchOutcome::RateLimited { reset } => {
                        stats.rate_limit_hits += 1;

                        if self.policy.max_retries > 0 && attempt >= self.policy.max_retries {
                            return Err(SyncError::RateLimitExhausted {
                                batch: index + 1,
                                attempts: attempt + 1,
                            });
                        }

                        let wait = self.policy.wait_for(reset.as_deref());
                        tracing::warn!(
                            "Rate limit on batch {} (reset header: {}), waiting {:?}",
                            index + 1,
                            reset.as_deref().unwrap_or("absent"),
                            wait
                        );
                        self.sleeper.sleep(wait).await;

                        if self.policy.max_retries == 0 {
                            // 不重送；下一次執行會再補上
                            tracing::warn!(
                                "Batch {} not resubmitted, {} domains left for the next run",
                                index + 1,
                                batch.len()
                            );
                            stats.skipped += batch.len();
                            break;
                        }
                        attempt += 1;
                    }
                }
            }
        }

        if total > 0 {
            self.write_progress(format_args!("\n"));
        }
        Ok(stats)
    }

    fn report_progress(&self, current: usize, total: usize, domain: &Domain) {
        tracing::trace!("Queued {}/{} - {}", current, total, domain);
        self.write_progress(format_args!("{}/{} - {}\r", current, total, domain));
    }

    // 進度只是顯示用途，寫入失敗不影響同步
    fn write_progress(&self, args: std::fmt::Arguments<'_>) {
        let Some(progress) = &self.progress else {
            return;
        };
        let mut writer = match progress.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writer.write_fmt(args).and_then(|_| writer.flush());
    }
}
