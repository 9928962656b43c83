use crate::core::batch::{RateLimitPolicy, DEFAULT_MAX_HONORED_RESET_SECONDS, MAX_BATCH_SIZE};
use crate::domain::model::{domains_from_whitespace, Domain, DomainSet};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(rename = "default", alias = "target")]
    pub target: TargetConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Clone, Deserialize)]
pub struct TargetConfig {
    pub domainbook_url: String,
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub group: String,
    #[serde(default)]
    pub exclude: Option<DomainList>,
}

// client_secret 不可出現在日誌中
impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("domainbook_url", &self.domainbook_url)
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .field("group", &self.group)
            .field("exclude", &self.exclude)
            .finish()
    }
}

/// 排除清單可寫成空白分隔字串或字串陣列
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DomainList {
    Text(String),
    List(Vec<String>),
}

impl DomainList {
    pub fn to_set(&self) -> DomainSet {
        match self {
            DomainList::Text(text) => domains_from_whitespace(text),
            DomainList::List(items) => items
                .iter()
                .flat_map(|item| item.split_whitespace())
                .map(Domain::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,
    #[serde(default = "default_group_source")]
    pub group_source: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            page_size: default_page_size(),
            comment_marker: default_comment_marker(),
            group_source: default_group_source(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_fallback_wait_seconds")]
    pub fallback_wait_seconds: u64,
    #[serde(default = "default_max_honored_reset_seconds")]
    pub max_honored_reset_seconds: Option<u64>,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            fallback_wait_seconds: default_fallback_wait_seconds(),
            max_honored_reset_seconds: default_max_honored_reset_seconds(),
            max_retries: 0,
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_page_size() -> usize {
    100
}

fn default_comment_marker() -> String {
    "###".to_string()
}

fn default_group_source() -> String {
    "cloud".to_string()
}

fn default_fallback_wait_seconds() -> u64 {
    10
}

fn default_max_honored_reset_seconds() -> Option<u64> {
    Some(DEFAULT_MAX_HONORED_RESET_SECONDS)
}

impl SyncConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SyncError::Config {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SYNC_CLIENT_SECRET})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let target = &self.target;
        validation::validate_url("default.domainbook_url", &target.domainbook_url)?;
        validation::validate_host_or_url("default.base_url", &target.base_url)?;
        validation::validate_non_empty_string("default.client_id", &target.client_id)?;
        validation::validate_non_empty_string("default.client_secret", &target.client_secret)?;
        validation::validate_non_empty_string("default.group", &target.group)?;

        for (field, value) in [
            ("default.client_id", &target.client_id),
            ("default.client_secret", &target.client_secret),
        ] {
            if value.starts_with("${") {
                return Err(SyncError::MissingConfig {
                    field: format!("{} (environment variable {} is not set)", field, value),
                });
            }
        }

        validation::validate_range("sync.batch_size", self.sync.batch_size, 1, MAX_BATCH_SIZE)?;
        validation::validate_range("sync.page_size", self.sync.page_size, 1, 1000)?;
        validation::validate_non_empty_string("sync.comment_marker", &self.sync.comment_marker)?;
        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 3600)?;

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            fallback_wait: Duration::from_secs(self.rate_limit.fallback_wait_seconds),
            max_honored_reset: self.rate_limit.max_honored_reset_seconds,
            max_retries: self.rate_limit.max_retries,
        }
    }
}

impl ConfigProvider for SyncConfig {
    fn domainbook_url(&self) -> &str {
        &self.target.domainbook_url
    }

    fn api_base_url(&self) -> String {
        let base = self.target.base_url.trim().trim_end_matches('/');
        if base.contains("://") {
            base.to_string()
        } else {
            format!("https://{}", base)
        }
    }

    fn client_id(&self) -> &str {
        &self.target.client_id
    }

    fn client_secret(&self) -> &str {
        &self.target.client_secret
    }

    fn group_query(&self) -> &str {
        &self.target.group
    }

    fn excluded_domains(&self) -> DomainSet {
        self.target
            .exclude
            .as_ref()
            .map(DomainList::to_set)
            .unwrap_or_default()
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
