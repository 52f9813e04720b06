use tracing::{debug, info};

use reclaim_model::ResourceGroup;

use crate::{cloud::ResourceGroupApi, error::ReclaimError};

/// Get the recorder group, creating it empty if it does not exist.
///
/// Any failure other than "not found" makes the registry unavailable and the
/// resource-group pass cannot proceed.
pub async fn ensure_recorder(
    api: &dyn ResourceGroupApi,
    name: &str,
) -> Result<ResourceGroup, ReclaimError> {
    match api.get_resource_group(name).await {
        Ok(rg) => {
            debug!(recorder = name, entries = rg.tags.len(), "recorder found");
            Ok(rg)
        }
        Err(e) if e.is_not_found() => {
            info!(recorder = name, "recorder missing; creating it");
            api.create_resource_group(name)
                .await
                .map_err(ReclaimError::RegistryUnavailable)
        }
        Err(e) => Err(ReclaimError::RegistryUnavailable(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::InMemoryCloud;
    use reclaim_model::TagSet;

    #[tokio::test]
    async fn returns_existing_recorder() {
        let cloud = InMemoryCloud::new();
        let mut tags = TagSet::new();
        tags.insert("rg-a", "100".to_string());
        cloud.add_group(ResourceGroup::new("rec").with_tags(tags));

        let rg = ensure_recorder(&cloud, "rec").await.unwrap();
        assert_eq!(rg.tags.get("rg-a").map(String::as_str), Some("100"));
        assert!(cloud.calls().created.is_empty());
    }

    #[tokio::test]
    async fn creates_missing_recorder() {
        let cloud = InMemoryCloud::new();

        let rg = ensure_recorder(&cloud, "rec").await.unwrap();
        assert!(rg.tags.is_empty());
        assert_eq!(cloud.calls().created, vec!["rec"]);
        assert!(cloud.group("rec").is_some());
    }

    #[tokio::test]
    async fn other_read_errors_are_fatal() {
        let cloud = InMemoryCloud::new();
        cloud.fail_group_reads(true);

        let err = ensure_recorder(&cloud, "rec").await.unwrap_err();
        assert!(matches!(err, ReclaimError::RegistryUnavailable(_)));
        assert!(cloud.calls().created.is_empty());
    }
}
