use serde::{Deserialize, Serialize};

use crate::TagSet;

/// Named container of cloud resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    /// Fully qualified control-plane identifier.
    #[serde(default)]
    pub id: String,
    /// Display name, unique within the subscription.
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: TagSet<String>,
}

impl ResourceGroup {
    /// Create a group with no tags.
    pub fn new<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        Self {
            id: String::new(),
            name: name.into(),
            location: String::new(),
            tags: TagSet::new(),
        }
    }

    /// Replace the tag set and return `self`.
    pub fn with_tags(mut self, tags: TagSet<String>) -> Self {
        self.tags = tags;
        self
    }
}
