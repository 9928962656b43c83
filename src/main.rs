use anyhow::Context;
use clap::Parser;
use domainbook_sync::domain::model::SyncReport;
use domainbook_sync::utils::{logger, validation::Validate};
use domainbook_sync::{CliArgs, DirectorySyncPipeline, SyncConfig, SyncEngine, SyncError, TokioSleeper};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // 初始化日誌 (<config>.log)
    let log_path = logger::log_file_for(&args.config_file);
    if let Err(e) = logger::init_file_logger(&log_path, args.verbose) {
        eprintln!("❌ Cannot open log file {}: {}", log_path.display(), e);
        return ExitCode::from(e.exit_code());
    }

    tracing::info!("Starting domainbook-sync");

    match run(&args).await {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("❌ Sync failed: {:#}", e);

            match e.downcast_ref::<SyncError>() {
                Some(sync_error) => {
                    tracing::error!(
                        "Category: {:?}, Severity: {:?}",
                        sync_error.category(),
                        sync_error.severity()
                    );
                    eprintln!("❌ {}", sync_error.user_friendly_message());
                    eprintln!("💡 {}", sync_error.recovery_suggestion());
                    eprintln!("📄 Details: {}", log_path.display());
                    ExitCode::from(sync_error.exit_code())
                }
                None => {
                    eprintln!("❌ {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run(args: &CliArgs) -> anyhow::Result<SyncReport> {
    tracing::info!("📁 Loading configuration from: {}", args.config_file.display());

    let config = SyncConfig::from_file(&args.config_file)?;
    config.validate()?;
    tracing::debug!("Config: {:?}", config);

    let pipeline = DirectorySyncPipeline::from_config(config, TokioSleeper)
        .context("failed to set up the sync pipeline")?;
    let engine = SyncEngine::new(pipeline).with_dry_run(args.dry_run);

    let report = engine.run().await?;
    Ok(report)
}

fn print_summary(report: &SyncReport) {
    let elapsed = report.finished_at - report.started_at;
    tracing::info!(
        "✅ Sync finished in {}ms: removed {}, added {}, skipped {}, batches {}, rate limited {}",
        elapsed.num_milliseconds(),
        report.stats.removed,
        report.stats.added,
        report.stats.skipped,
        report.stats.batches_submitted,
        report.stats.rate_limit_hits
    );

    if report.dry_run {
        println!("🔍 Dry run complete, no changes were made");
        return;
    }

    println!(
        "✅ Removed {} and added {} domains",
        report.stats.removed, report.stats.added
    );
    if report.stats.skipped > 0 {
        println!(
            "⚠️  {} domains were not added because of rate limiting; run again to add them",
            report.stats.skipped
        );
    }
}
