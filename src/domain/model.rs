use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

/// 網域名稱，以原始字串比對 (區分大小寫、不做正規化)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Domain(String);

impl Domain {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Domain {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Domain {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub type DomainSet = BTreeSet<Domain>;

/// 以空白分隔的網域清單轉為集合
pub fn domains_from_whitespace(text: &str) -> DomainSet {
    text.split_whitespace().map(Domain::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 本次執行期間有效的存取權杖；Debug 輸出不含權杖內容
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<REDACTED>)")
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: BearerToken,
    pub group_id: GroupId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub to_remove: DomainSet,
    pub to_add: DomainSet,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// extract 階段的輸出
#[derive(Debug, Clone)]
pub struct SyncSnapshot {
    pub session: Session,
    pub authoritative: DomainSet,
    pub current: DomainSet,
    pub excluded: DomainSet,
}

/// transform 階段的輸出
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub session: Session,
    pub diff: DiffResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationStats {
    pub removed: usize,
    pub added: usize,
    /// 因 429 而未重送的批次內網域數
    pub skipped: usize,
    pub batches_submitted: usize,
    pub rate_limit_hits: usize,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub planned_removals: usize,
    pub planned_additions: usize,
    pub stats: MutationStats,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_from_whitespace() {
        let set = domains_from_whitespace("a.com\tb.com\n\n  a.com c.com ");
        let expected: DomainSet = ["a.com", "b.com", "c.com"].into_iter().map(Domain::from).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_domain_equality_is_case_sensitive() {
        assert_ne!(Domain::from("Example.com"), Domain::from("example.com"));
    }

    #[test]
    fn test_bearer_token_debug_is_redacted() {
        let token = BearerToken::new("secret-token-value");
        assert!(!format!("{:?}", token).contains("secret-token-value"));
        assert_eq!(token.expose(), "secret-token-value");
    }
}
