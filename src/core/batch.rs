use crate::domain::model::{Domain, DomainSet};
use std::time::Duration;

/// add-group-member 單次請求可接受的最大筆數
pub const MAX_BATCH_SIZE: usize = 500;

pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// 預設最多信任 60 秒的 reset 值
pub const DEFAULT_MAX_HONORED_RESET_SECONDS: u64 = 60;

pub fn split_into_batches(domains: &DomainSet, batch_size: usize) -> Vec<Vec<Domain>> {
    let ordered: Vec<Domain> = domains.iter().cloned().collect();
    ordered
        .chunks(batch_size.clamp(1, MAX_BATCH_SIZE))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// 收到 429 時的等待規則
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// 沒有 (或無法解析) reset 標頭時的固定等待時間
    pub fallback_wait: Duration,
    /// reset 值超過此上限時改用 fallback_wait；None 表示不設上限
    pub max_honored_reset: Option<u64>,
    /// 0 = 等待一次後不重送該批次
    pub max_retries: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            fallback_wait: Duration::from_secs(10),
            max_honored_reset: Some(DEFAULT_MAX_HONORED_RESET_SECONDS),
            max_retries: 0,
        }
    }
}

impl RateLimitPolicy {
    pub fn wait_for(&self, reset_header: Option<&str>) -> Duration {
        let reset = reset_header.and_then(|value| value.trim().parse::<u64>().ok());

        match (reset, self.max_honored_reset) {
            (Some(seconds), Some(cap)) if seconds > cap => self.fallback_wait,
            (Some(seconds), _) => Duration::from_secs(seconds.saturating_add(1)),
            (None, _) => self.fallback_wait,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(n: usize) -> DomainSet {
        (0..n).map(|i| Domain::new(format!("d{:05}.example", i))).collect()
    }

    #[test]
    fn test_batch_count_and_last_batch_size() {
        for (n, expected_batches, expected_last) in [
            (1, 1, 1),
            (499, 1, 499),
            (500, 1, 500),
            (501, 2, 1),
            (1000, 2, 500),
            (1001, 3, 1),
        ] {
            let batches = split_into_batches(&domains(n), MAX_BATCH_SIZE);
            assert_eq!(batches.len(), expected_batches, "n = {}", n);
            assert_eq!(batches.last().unwrap().len(), expected_last, "n = {}", n);
            assert!(batches.iter().all(|b| b.len() <= MAX_BATCH_SIZE));
        }
    }

    #[test]
    fn test_empty_set_has_no_batches() {
        assert!(split_into_batches(&DomainSet::new(), MAX_BATCH_SIZE).is_empty());
    }

    #[test]
    fn test_batch_size_is_capped() {
        let batches = split_into_batches(&domains(1200), 10_000);
        assert_eq!(batches.len(), 3);
    }

    #[test]
    fn test_wait_uses_reset_plus_one() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.wait_for(Some("0")), Duration::from_secs(1));
        assert_eq!(policy.wait_for(Some("1")), Duration::from_secs(2));
        assert_eq!(policy.wait_for(Some("5")), Duration::from_secs(6));
    }

    #[test]
    fn test_wait_falls_back_without_usable_header() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.wait_for(None), Duration::from_secs(10));
        assert_eq!(policy.wait_for(Some("soon")), Duration::from_secs(10));
    }

    #[test]
    fn test_wait_ignores_oversized_reset_by_default() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.wait_for(Some("60")), Duration::from_secs(61));
        assert_eq!(policy.wait_for(Some("61")), Duration::from_secs(10));
        assert_eq!(policy.wait_for(Some("86400")), Duration::from_secs(10));
        assert_eq!(
            policy.wait_for(Some("18446744073709551615")),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_wait_respects_reset_cap() {
        let policy = RateLimitPolicy {
            max_honored_reset: Some(1),
            ..RateLimitPolicy::default()
        };
        assert_eq!(policy.wait_for(Some("1")), Duration::from_secs(2));
        assert_eq!(policy.wait_for(Some("5")), Duration::from_secs(10));
    }
}
