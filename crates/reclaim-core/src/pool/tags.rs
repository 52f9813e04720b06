use reclaim_model::{PoolTags, RunnerNamePattern};
use serde_json::Value;

/// Rebuild a pool's tag set for the next pass.
///
/// A key is dropped if it matches `pattern` or names a runner in `observed`, which
/// clears every marker of the previous pass, including markers of runners whose
/// names fall outside the pattern. Each name in `pending` is then inserted with
/// `stamp`. All other keys are carried over unchanged.
///
/// # Examples
/// ```
/// use reclaim_core::rebuild_pool_tags;
/// use reclaim_model::{PoolTags, RunnerNamePattern};
/// use serde_json::json;
///
/// let mut tags = PoolTags::new();
/// tags.insert("team", json!("infra"));
/// tags.insert("old000runner000", json!("2026-01-01T00:00:00Z"));
///
/// let next = rebuild_pool_tags(
///     &tags,
///     &[],
///     &["abc123def456789".to_string()],
///     &RunnerNamePattern::default(),
///     "2026-01-01T01:00:00Z",
/// );
/// assert_eq!(next.keys().collect::<Vec<_>>(), vec!["abc123def456789", "team"]);
/// ```
pub fn rebuild_pool_tags(
    existing: &PoolTags,
    observed: &[&str],
    pending: &[String],
    pattern: &RunnerNamePattern,
    stamp: &str,
) -> PoolTags {
    let mut tags = existing.clone();
    tags.retain(|k, _| !pattern.is_runner_key(k) && !observed.contains(&k));
    for name in pending {
        tags.insert(name.as_str(), Value::String(stamp.to_string()));
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn existing() -> PoolTags {
        let mut tags = PoolTags::new();
        tags.insert("abc123def456789", json!("2026-01-01T00:00:00Z"));
        tags.insert("zzz000yyy111xxx", json!("2026-01-01T00:00:00Z"));
        tags.insert("team", json!("infra"));
        tags.insert("budget", json!(12));
        tags
    }

    #[test]
    fn drops_unconfirmed_runner_keys_and_keeps_foreign_ones() {
        let pattern = RunnerNamePattern::default();
        let tags = rebuild_pool_tags(
            &existing(),
            &[],
            &["abc123def456789".to_string()],
            &pattern,
            "now",
        );

        assert_eq!(tags.get("abc123def456789"), Some(&json!("now")));
        assert!(!tags.contains("zzz000yyy111xxx"));
        assert_eq!(tags.get("team"), Some(&json!("infra")));
        assert_eq!(tags.get("budget"), Some(&json!(12)));
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn empty_pending_clears_all_runner_keys() {
        let pattern = RunnerNamePattern::default();
        let tags = rebuild_pool_tags(&existing(), &[], &[], &pattern, "now");

        assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["budget", "team"]);
    }

    #[test]
    fn observed_runner_outside_pattern_is_cleared() {
        let pattern = RunnerNamePattern::default();
        let mut tags = existing();
        tags.insert("Runner-ABC-0001", json!("2026-01-01T00:00:00Z"));

        let rebuilt = rebuild_pool_tags(&tags, &["Runner-ABC-0001"], &[], &pattern, "now");
        assert!(!rebuilt.contains("Runner-ABC-0001"));

        let kept = rebuild_pool_tags(&tags, &[], &[], &pattern, "now");
        assert!(kept.contains("Runner-ABC-0001"), "unobserved foreign keys survive");
    }
}
