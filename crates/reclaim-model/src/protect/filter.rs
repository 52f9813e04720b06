use std::{collections::BTreeSet, fmt};

use crate::{
    DEFAULT_RECORDER_NAME, DO_NOT_DELETE_TAG, ModelResult, RESERVED_SYSTEM_PREFIX, TagSet,
    protect::hash::{BUILTIN_DENIED_HASHES, name_hash, normalize_hash},
};

/// Outcome of a protection check, naming the rule that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Name starts with a reserved system prefix.
    ReservedPrefix,
    /// Name is the registry's own recorder group.
    Recorder,
    /// Hash of the name is on the denylist.
    Denylisted,
    /// Tag set carries the "do not delete" marker.
    Marked,
    /// No rule matched; the resource may be reclaimed.
    Eligible,
}

impl Protection {
    #[inline]
    pub fn is_protected(&self) -> bool {
        !matches!(self, Protection::Eligible)
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Protection::ReservedPrefix => "reserved_prefix",
            Protection::Recorder => "recorder",
            Protection::Denylisted => "denylisted",
            Protection::Marked => "marked",
            Protection::Eligible => "eligible",
        }
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Pure "must not delete" predicate over a resource name and its tags.
///
/// Rules are evaluated in order and the first match wins:
/// 1. reserved name prefix;
/// 2. recorder name;
/// 3. name hash on the denylist;
/// 4. marker tag present.
#[derive(Debug, Clone)]
pub struct ProtectionFilter {
    reserved_prefixes: Vec<String>,
    recorder_name: String,
    denied_hashes: BTreeSet<String>,
    marker_key: String,
}

impl ProtectionFilter {
    /// Filter with the default prefix, marker key and built-in denylist.
    pub fn new<N>(recorder_name: N) -> Self
    where
        N: Into<String>,
    {
        Self {
            reserved_prefixes: vec![RESERVED_SYSTEM_PREFIX.to_string()],
            recorder_name: recorder_name.into(),
            denied_hashes: BUILTIN_DENIED_HASHES.iter().map(|h| h.to_string()).collect(),
            marker_key: DO_NOT_DELETE_TAG.to_string(),
        }
    }

    /// Replace the reserved prefixes.
    pub fn with_reserved_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the marker tag key.
    pub fn with_marker_key<K>(mut self, key: K) -> Self
    where
        K: Into<String>,
    {
        self.marker_key = key.into();
        self
    }

    /// Add a hex MD5 name hash to the denylist. Case and surrounding whitespace are ignored.
    pub fn deny_hash(&mut self, hash: &str) -> ModelResult<()> {
        self.denied_hashes.insert(normalize_hash(hash)?);
        Ok(())
    }

    /// Add a literal name to the denylist. Only its hash is kept.
    pub fn deny_name(&mut self, name: &str) {
        self.denied_hashes.insert(name_hash(name));
    }

    pub fn recorder_name(&self) -> &str {
        &self.recorder_name
    }

    pub fn marker_key(&self) -> &str {
        &self.marker_key
    }

    /// Evaluate the rules and return the one that matched.
    ///
    /// Rules are checked in a fixed order: reserved prefix, recorder name, hashed
    /// denylist, then the marker tag. The first match wins, which is what the
    /// returned [`Protection`] reports; [`Protection::Eligible`] means no rule fired.
    ///
    /// # Examples
    /// ```
    /// use reclaim_model::{Protection, ProtectionFilter, TagSet};
    ///
    /// let filter = ProtectionFilter::new("residualrgrecorder")
    ///     .with_reserved_prefixes(["MC_"])
    ///     .with_marker_key("do_not_delete");
    /// let none: TagSet = TagSet::new();
    /// let marked: TagSet = [("do_not_delete", String::new())].into_iter().collect();
    ///
    /// assert_eq!(filter.verdict("MC_nodes", &marked), Protection::ReservedPrefix);
    /// assert_eq!(filter.verdict("residualrgrecorder", &none), Protection::Recorder);
    /// assert_eq!(filter.verdict("scratch", &marked), Protection::Marked);
    /// assert_eq!(filter.verdict("scratch", &none), Protection::Eligible);
    /// ```
    pub fn verdict<V>(&self, name: &str, tags: &TagSet<V>) -> Protection {
        if self
            .reserved_prefixes
            .iter()
            .any(|p| !p.is_empty() && name.starts_with(p.as_str()))
        {
            return Protection::ReservedPrefix;
        }
        if name == self.recorder_name {
            return Protection::Recorder;
        }
        if self.denied_hashes.contains(&name_hash(name)) {
            return Protection::Denylisted;
        }
        if tags.contains(&self.marker_key) {
            return Protection::Marked;
        }
        Protection::Eligible
    }

    /// Returns `true` if the resource must not be deleted.
    #[inline]
    pub fn is_protected<V>(&self, name: &str, tags: &TagSet<V>) -> bool {
        self.verdict(name, tags).is_protected()
    }
}

impl Default for ProtectionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_RECORDER_NAME)
    }
}
