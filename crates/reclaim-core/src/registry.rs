//! The recorder group's tag set, read as a mark-and-sweep ledger.
//!
//! Each key is the name of a candidate resource group and each value the epoch
//! seconds of its first sighting. The ledger is capacity-capped: a name is only
//! registered while `len() < capacity()`.
use std::collections::BTreeSet;

use reclaim_model::TagSet;

#[derive(Debug, Clone)]
pub struct Registry {
    entries: TagSet<String>,
    capacity: usize,
}

impl Registry {
    pub fn new(entries: TagSet<String>, capacity: usize) -> Self {
        Self { entries, capacity }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` once no further name may be registered.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// First-sighting time in epoch seconds, if the entry holds a parseable value.
    pub fn first_seen(&self, name: &str) -> Option<i64> {
        self.entries.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Drop every entry whose name is not in `existing`, returning the dropped names.
    ///
    /// A group removed out-of-band must not leave an entry behind: a new group
    /// reusing the name would otherwise be deleted on its first sighting.
    pub fn prune<'a, I>(&mut self, existing: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let existing: BTreeSet<&str> = existing.into_iter().collect();
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|k| !existing.contains(k))
            .map(str::to_string)
            .collect();
        for name in &stale {
            self.entries.remove(name);
        }
        stale
    }

    /// Register a first sighting. Returns `false` if already present or full.
    ///
    /// An existing entry keeps its original stamp, so repeated sightings never
    /// restart the grace period. A group refused because the registry is full is
    /// simply seen again on a later pass.
    ///
    /// # Examples
    /// ```
    /// use reclaim_core::Registry;
    /// use reclaim_model::TagSet;
    ///
    /// let mut reg = Registry::new(TagSet::new(), 1);
    /// assert!(reg.mark("rg-a", "1700000000"));
    /// assert!(!reg.mark("rg-a", "1700000600"));
    /// assert!(!reg.mark("rg-b", "1700000600"));
    /// assert_eq!(reg.first_seen("rg-a"), Some(1_700_000_000));
    /// ```
    pub fn mark(&mut self, name: &str, stamp: impl Into<String>) -> bool {
        if self.contains(name) || self.is_full() {
            return false;
        }
        self.entries.insert(name, stamp.into());
        true
    }

    /// Remove an entry. Returns `true` if it was present.
    pub fn unmark(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Evict entries beyond capacity, most recent sightings first.
    ///
    /// Only needed when the stored ledger was written with a larger capacity.
    /// Evicted names lose their grace progress and are re-marked later.
    pub fn shrink_to_capacity(&mut self) -> Vec<String> {
        let excess = self.entries.len().saturating_sub(self.capacity);
        if excess == 0 {
            return Vec::new();
        }
        let mut by_age: Vec<(Option<i64>, String)> = self
            .entries
            .keys()
            .map(|k| (self.first_seen(k), k.to_string()))
            .collect();
        // newest first; unparseable stamps sort as newest
        by_age.sort_by(|a, b| match (a.0, b.0) {
            (None, None) => a.1.cmp(&b.1),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.1.cmp(&b.1)),
        });
        let evicted: Vec<String> = by_age.into_iter().take(excess).map(|(_, k)| k).collect();
        for name in &evicted {
            self.entries.remove(name);
        }
        evicted
    }

    pub fn tags(&self) -> &TagSet<String> {
        &self.entries
    }

    pub fn into_tags(self) -> TagSet<String> {
        self.entries
    }
}
