use std::collections::BTreeSet;

use reclaim_model::{Protection, ProtectionFilter, ResourceGroup};

use crate::registry::Registry;

/// Decisions of one mark/sweep iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepPlan {
    /// Registered groups seen again: delete them.
    pub deletions: Vec<String>,
    /// Unregistered groups recorded this pass.
    pub marked: Vec<String>,
    /// Groups exempted by the protection filter, with the matching rule.
    pub protected: Vec<(String, Protection)>,
    /// Eligible groups left unregistered because the registry is full.
    pub deferred: Vec<String>,
    /// Entries dropped to bring an oversized registry back to capacity.
    pub evicted: Vec<String>,
}

/// Walk the current groups and update `registry` in memory.
///
/// Protected groups are skipped (their entries, if any, stay). A registered group
/// is scheduled for deletion and its entry removed; an unregistered one is
/// recorded with `stamp` while there is room. Names repeated in the listing are
/// decided once. Stale entries must already have been pruned.
pub fn plan_sweep(
    registry: &mut Registry,
    groups: &[ResourceGroup],
    filter: &ProtectionFilter,
    stamp: &str,
) -> SweepPlan {
    let mut plan = SweepPlan::default();
    let mut decided = BTreeSet::new();

    for rg in groups {
        if !decided.insert(rg.name.as_str()) {
            continue;
        }
        let verdict = filter.verdict(&rg.name, &rg.tags);
        if verdict.is_protected() {
            plan.protected.push((rg.name.clone(), verdict));
            continue;
        }
        if registry.unmark(&rg.name) {
            plan.deletions.push(rg.name.clone());
        } else if registry.mark(&rg.name, stamp) {
            plan.marked.push(rg.name.clone());
        } else {
            plan.deferred.push(rg.name.clone());
        }
    }
    plan.evicted = registry.shrink_to_capacity();
    plan
}
