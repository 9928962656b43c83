use crate::domain::model::{MutationStats, SyncReport};
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use chrono::Utc;
use tracing::Instrument;

pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
    dry_run: bool,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let span = tracing::info_span!("sync", dry_run = self.dry_run);
        self.run_phases().instrument(span).await
    }

    async fn run_phases(&self) -> Result<SyncReport> {
        let started_at = Utc::now();

        // Extract
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Authoritative: {} domains, current members: {}, excluded: {}",
            snapshot.authoritative.len(),
            snapshot.current.len(),
            snapshot.excluded.len()
        );

        // Transform
        let plan = self.pipeline.transform(snapshot).await?;
        let planned_removals = plan.diff.to_remove.len();
        let planned_additions = plan.diff.to_add.len();

        if self.dry_run {
            tracing::info!("DRY RUN - no changes sent to the directory");
            println!(
                "Dry run: would remove {} and add {} domains",
                planned_removals, planned_additions
            );
            return Ok(SyncReport {
                planned_removals,
                planned_additions,
                stats: MutationStats::default(),
                dry_run: true,
                started_at,
                finished_at: Utc::now(),
            });
        }

        // Load
        let stats = self.pipeline.load(plan).await?;

        Ok(SyncReport {
            planned_removals,
            planned_additions,
            stats,
            dry_run: false,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconcile::reconcile;
    use crate::domain::model::{
        BearerToken, Domain, DomainSet, GroupId, Session, SyncPlan, SyncSnapshot,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticPipeline {
        loads: AtomicUsize,
    }

    fn set(items: &[&str]) -> DomainSet {
        items.iter().map(|s| Domain::from(*s)).collect()
    }

    #[async_trait::async_trait]
    impl Pipeline for StaticPipeline {
        async fn extract(&self) -> Result<SyncSnapshot> {
            Ok(SyncSnapshot {
                session: Session {
                    token: BearerToken::new("t"),
                    group_id: GroupId::new("g"),
                },
                authoritative: set(&["a.com", "b.com", "c.com"]),
                current: set(&["b.com", "c.com", "d.com"]),
                excluded: set(&["c.com"]),
            })
        }

        async fn transform(&self, snapshot: SyncSnapshot) -> Result<SyncPlan> {
            let diff = reconcile(&snapshot.authoritative, &snapshot.current, &snapshot.excluded);
            Ok(SyncPlan {
                session: snapshot.session,
                diff,
            })
        }

        async fn load(&self, plan: SyncPlan) -> Result<MutationStats> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(MutationStats {
                removed: plan.diff.to_remove.len(),
                added: plan.diff.to_add.len(),
                batches_submitted: 1,
                ..MutationStats::default()
            })
        }
    }

    #[tokio::test]
    async fn test_run_goes_through_all_phases() {
        let engine = SyncEngine::new(StaticPipeline {
            loads: AtomicUsize::new(0),
        });

        let report = engine.run().await.unwrap();

        assert_eq!(report.planned_removals, 2);
        assert_eq!(report.planned_additions, 1);
        assert_eq!(report.stats.removed, 2);
        assert_eq!(report.stats.added, 1);
        assert!(!report.dry_run);
        assert!(report.finished_at >= report.started_at);
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dry_run_skips_load() {
        let engine = SyncEngine::new(StaticPipeline {
            loads: AtomicUsize::new(0),
        })
        .with_dry_run(true);

        let report = engine.run().await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.planned_removals, 2);
        assert_eq!(report.stats, MutationStats::default());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
