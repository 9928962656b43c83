use crate::domain::model::{DiffResult, DomainSet};

/// 計算差異：
/// - remove = (current - authoritative) ∪ excluded
/// - add    = (authoritative - current) - excluded
///
/// 排除清單永遠優先，即使網域同時在權威清單中也會被移除。
pub fn reconcile(
    authoritative: &DomainSet,
    current: &DomainSet,
    excluded: &DomainSet,
) -> DiffResult {
    let to_remove = current
        .difference(authoritative)
        .chain(excluded.iter())
        .cloned()
        .collect();

    let to_add = authoritative
        .difference(current)
        .filter(|domain| !excluded.contains(*domain))
        .cloned()
        .collect();

    DiffResult { to_remove, to_add }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Domain;

    fn set(items: &[&str]) -> DomainSet {
        items.iter().map(|s| Domain::from(*s)).collect()
    }

    #[test]
    fn test_reference_scenario() {
        let authoritative = set(&["a.com", "b.com", "c.com"]);
        let current = set(&["b.com", "c.com", "d.com"]);
        let excluded = set(&["c.com"]);

        let diff = reconcile(&authoritative, &current, &excluded);

        assert_eq!(diff.to_remove, set(&["c.com", "d.com"]));
        assert_eq!(diff.to_add, set(&["a.com"]));
    }

    #[test]
    fn test_excluded_never_added() {
        let authoritative = set(&["a.com", "x.com"]);
        let current = set(&[]);
        let excluded = set(&["x.com", "y.com"]);

        let diff = reconcile(&authoritative, &current, &excluded);

        assert_eq!(diff.to_add, set(&["a.com"]));
        // 未在群組中的排除網域仍會進入 remove
        assert_eq!(diff.to_remove, set(&["x.com", "y.com"]));
    }

    #[test]
    fn test_in_sync_group_has_empty_diff() {
        let authoritative = set(&["a.com", "b.com"]);
        let diff = reconcile(&authoritative, &authoritative.clone(), &DomainSet::new());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_reconcile_is_pure() {
        let authoritative = set(&["a.com", "b.com"]);
        let current = set(&["b.com", "z.com"]);
        let excluded = set(&["b.com"]);

        let first = reconcile(&authoritative, &current, &excluded);
        let second = reconcile(&authoritative, &current, &excluded);
        assert_eq!(first, second);
    }

    #[test]
    fn test_applying_diff_converges_to_authority_minus_excluded() {
        let cases = [
            (set(&["a", "b", "c"]), set(&["b", "c", "d"]), set(&["c"])),
            (set(&[]), set(&["a", "b"]), set(&[])),
            (set(&["a", "b"]), set(&[]), set(&["b", "q"])),
            (set(&["a", "b", "c", "d"]), set(&["a", "e", "f"]), set(&["f", "a"])),
        ];

        for (authoritative, current, excluded) in cases {
            let diff = reconcile(&authoritative, &current, &excluded);

            assert!(diff.to_add.is_disjoint(&excluded));
            assert!(diff.to_add.is_disjoint(&diff.to_remove));

            let converged: DomainSet = current
                .difference(&diff.to_remove)
                .cloned()
                .chain(diff.to_add.iter().cloned())
                .collect();
            let expected: DomainSet = authoritative.difference(&excluded).cloned().collect();

            assert_eq!(converged, expected);
        }
    }
}
