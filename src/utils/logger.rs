use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::error::Result;

/// 日誌檔名: 配置檔名加上 `.log`
pub fn log_file_for(config_file: &Path) -> PathBuf {
    let mut name = config_file.as_os_str().to_os_string();
    name.push(".log");
    PathBuf::from(name)
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("domainbook_sync=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("domainbook_sync=info"))
    }
}

/// 每次執行都覆寫日誌檔
pub fn init_file_logger(log_path: &Path, verbose: bool) -> Result<()> {
    let file = File::create(log_path)?;

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    Ok(())
}
