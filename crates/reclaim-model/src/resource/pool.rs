use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PoolTags;

/// Group configuration hosting ephemeral runners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Resource group the pool lives in.
    pub resource_group: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: PoolTags,
}

impl Pool {
    pub fn new<G, N>(resource_group: G, name: N) -> Self
    where
        G: Into<String>,
        N: Into<String>,
    {
        Self {
            id: String::new(),
            name: name.into(),
            resource_group: resource_group.into(),
            location: String::new(),
            tags: PoolTags::new(),
        }
    }

    pub fn with_tags(mut self, tags: PoolTags) -> Self {
        self.tags = tags;
        self
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.name)
    }
}

/// Allocation state reported for a runner registration.
///
/// Only `Allocated` drives reclamation; every other status is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunnerStatus {
    Allocated,
    Other(String),
}

impl RunnerStatus {
    #[inline]
    pub fn is_allocated(&self) -> bool {
        matches!(self, RunnerStatus::Allocated)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunnerStatus::Allocated => "Allocated",
            RunnerStatus::Other(s) => s,
        }
    }
}

impl From<String> for RunnerStatus {
    fn from(s: String) -> Self {
        if s == "Allocated" {
            RunnerStatus::Allocated
        } else {
            RunnerStatus::Other(s)
        }
    }
}

impl From<&str> for RunnerStatus {
    fn from(s: &str) -> Self {
        RunnerStatus::from(s.to_string())
    }
}

impl From<RunnerStatus> for String {
    fn from(s: RunnerStatus) -> Self {
        match s {
            RunnerStatus::Allocated => "Allocated".to_string(),
            RunnerStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for RunnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single ephemeral worker registration within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    /// Registration id used to purge the runner.
    pub id: String,
    /// Runner name, used as the pool tag key.
    pub name: String,
    pub status: RunnerStatus,
}

impl Runner {
    pub fn new<I, N, S>(id: I, name: N, status: S) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        S: Into<RunnerStatus>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parses_allocated_exactly() {
        assert!(RunnerStatus::from("Allocated").is_allocated());
        assert!(!RunnerStatus::from("allocated").is_allocated());
        assert!(!RunnerStatus::from("Ready").is_allocated());
    }

    #[test]
    fn status_keeps_unknown_values() {
        let runner: Runner = serde_json::from_value(json!({
            "id": "r-1",
            "name": "abc123def456789",
            "status": "Provisioning"
        }))
        .unwrap();

        assert_eq!(runner.status, RunnerStatus::Other("Provisioning".into()));
        assert_eq!(
            serde_json::to_value(&runner).unwrap()["status"],
            json!("Provisioning")
        );
    }

    #[test]
    fn pool_display_is_group_slash_name() {
        let pool = Pool::new("rg-runners", "gh-pool");
        assert_eq!(pool.to_string(), "rg-runners/gh-pool");
    }

    #[test]
    fn pool_deserializes_camel_case() {
        let pool: Pool = serde_json::from_value(json!({
            "name": "gh-pool",
            "resourceGroup": "rg-runners",
            "tags": {"abc123def456789": "2026-01-01T00:00:00Z", "cost": 3}
        }))
        .unwrap();

        assert_eq!(pool.resource_group, "rg-runners");
        assert_eq!(pool.tags.len(), 2);
    }
}
