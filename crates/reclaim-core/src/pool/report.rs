/// Counters for one pool pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolPassReport {
    /// Pools returned by the listing.
    pub pools: usize,
    /// Pools whose tags were rewritten.
    pub reconciled: usize,
    /// Pools skipped because their runners could not be listed.
    pub skipped: usize,
    pub tag_write_failures: usize,
    /// Runners seen allocated for the first time.
    pub marked: usize,
    pub purged: usize,
    pub purge_failures: usize,
    /// `true` if cancellation stopped the pass before every pool was visited.
    pub canceled: bool,
}

/// Result of reconciling a single pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PoolOutcome {
    pub skipped: bool,
    pub marked: usize,
    pub purged: usize,
    pub purge_failures: usize,
    pub tag_write_failed: bool,
}

impl PoolPassReport {
    pub(crate) fn absorb(&mut self, o: PoolOutcome) {
        if o.skipped {
            self.skipped += 1;
            return;
        }
        if o.tag_write_failed {
            self.tag_write_failures += 1;
        } else {
            self.reconciled += 1;
        }
        self.marked += o.marked;
        self.purged += o.purged;
        self.purge_failures += o.purge_failures;
    }
}
