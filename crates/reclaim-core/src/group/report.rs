/// Counters for one resource-group pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPassReport {
    /// Groups returned by the listing.
    pub groups: usize,
    /// Stale registry entries removed.
    pub pruned: usize,
    /// Groups registered on first sighting.
    pub marked: usize,
    pub deleted: usize,
    pub delete_failures: usize,
    /// Deletions abandoned because the pass was canceled.
    pub delete_canceled: usize,
    pub protected: usize,
    /// Eligible groups not registered because the registry was full.
    pub deferred: usize,
    pub evicted: usize,
    /// Registry size as written back.
    pub registry_len: usize,
}
