use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key–value tag storage of a cloud resource.
///
/// The reclaimer treats a tag set as a whole: it is read in full, edited in memory
/// and written back as a single replacing update. Keys are unique; iteration order is
/// deterministic (sorted) but carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet<V = String>(BTreeMap<String, V>);

/// Tag set of a runner pool, whose values may be any JSON scalar.
pub type PoolTags = TagSet<serde_json::Value>;

impl<V> TagSet<V> {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no tags are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the key is present, whatever its value.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Get the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    /// Insert or overwrite a tag, returning the previous value.
    pub fn insert<K>(&mut self, key: K, val: V) -> Option<V>
    where
        K: Into<String>,
    {
        self.0.insert(key.into(), val)
    }

    /// Remove a tag, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.0.remove(key)
    }

    /// Keep only the tags for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &V) -> bool,
    {
        self.0.retain(|k, v| keep(k.as_str(), v));
    }

    /// Iterate over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// Iterate through all tags as `(&str, &V)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for TagSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for TagSet<V>
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<V> From<BTreeMap<String, V>> for TagSet<V> {
    fn from(map: BTreeMap<String, V>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_get_remove() {
        let mut tags = TagSet::new();
        assert!(tags.is_empty());

        assert_eq!(tags.insert("owner", "ci".to_string()), None);
        assert_eq!(tags.insert("owner", "bot".to_string()), Some("ci".to_string()));
        assert_eq!(tags.get("owner").map(String::as_str), Some("bot"));
        assert!(tags.contains("owner"));
        assert_eq!(tags.len(), 1);

        assert_eq!(tags.remove("owner"), Some("bot".to_string()));
        assert!(!tags.contains("owner"));
    }

    #[test]
    fn retain_filters_by_key() {
        let mut tags: TagSet = [("a", "1"), ("bb", "2"), ("ccc", "3")]
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();

        tags.retain(|k, _| k.len() != 2);
        assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["a", "ccc"]);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut tags: PoolTags = TagSet::new();
        tags.insert("team", json!("infra"));
        tags.insert("budget", json!(42));

        let value = serde_json::to_value(&tags).unwrap();
        assert_eq!(value, json!({"team": "infra", "budget": 42}));

        let back: PoolTags = serde_json::from_value(value).unwrap();
        assert_eq!(back, tags);
    }
}
