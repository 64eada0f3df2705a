//! Learning playlist construction
//!
//! Turns a [`WeaknessMap`] into an ordered playlist of topics with
//! learning resources. Topics are ranked by weakness, truncated to a
//! configurable count, and looked up concurrently. A failed, slow, or
//! panicking lookup costs only its own topic's resources.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use skillpath_core::WeaknessMap;

use crate::provider::{Resource, ResourceProvider};

/// Tuning knobs for playlist construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Maximum number of topics in the playlist
    pub max_topics: usize,
    /// Maximum resources kept per topic
    pub max_resources_per_topic: usize,
    /// Per-topic lookup timeout in milliseconds
    pub lookup_timeout_ms: u64,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            max_topics: 5,
            max_resources_per_topic: 5,
            lookup_timeout_ms: 5000,
        }
    }
}

/// One topic's slot in the playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Topic name
    pub topic: String,
    /// Weakness score that earned the slot
    pub weakness: f64,
    /// Recommended resources, deduplicated by url
    pub resources: Vec<Resource>,
}

/// Build a learning playlist from a weakness map.
///
/// Entries come back in descending weakness order (ties broken
/// lexically by topic), truncated to `max_topics`. Lookups for the
/// selected topics run concurrently; a topic whose lookup fails, times
/// out, or panics keeps its slot with an empty resource list.
pub async fn build_playlist(
    weaknesses: &WeaknessMap,
    provider: Arc<dyn ResourceProvider>,
    config: &PlaylistConfig,
) -> Vec<PlaylistEntry> {
    let mut topics = weaknesses.topics_by_severity();
    topics.truncate(config.max_topics);

    let timeout = Duration::from_millis(config.lookup_timeout_ms);
    let handles: Vec<_> = topics
        .into_iter()
        .map(|(topic, weakness)| {
            let provider = Arc::clone(&provider);
            let lookup_topic = topic.clone();
            let handle = tokio::spawn(async move {
                tokio::time::timeout(timeout, provider.resources_for(&lookup_topic)).await
            });
            (topic, weakness, handle)
        })
        .collect();

    let mut playlist = Vec::with_capacity(handles.len());
    for (topic, weakness, handle) in handles {
        let resources = match handle.await {
            Ok(Ok(Ok(resources))) => {
                dedup_and_cap(resources, config.max_resources_per_topic)
            }
            Ok(Ok(Err(error))) => {
                warn!(topic = %topic, %error, "resource lookup failed");
                Vec::new()
            }
            Ok(Err(_)) => {
                warn!(topic = %topic, timeout_ms = config.lookup_timeout_ms, "resource lookup timed out");
                Vec::new()
            }
            Err(join_error) => {
                warn!(topic = %topic, %join_error, "resource lookup task failed");
                Vec::new()
            }
        };
        debug!(topic = %topic, count = resources.len(), "playlist entry built");
        playlist.push(PlaylistEntry {
            topic,
            weakness,
            resources,
        });
    }
    playlist
}

/// Drop duplicate urls (first occurrence wins) and cap the list.
fn dedup_and_cap(resources: Vec<Resource>, cap: usize) -> Vec<Resource> {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for resource in resources {
        if kept.len() >= cap {
            break;
        }
        if seen.insert(resource.url.clone()) {
            kept.push(resource);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderError, StaticResourceProvider};
    use async_trait::async_trait;

    fn weaknesses(entries: &[(&str, f64)]) -> WeaknessMap {
        entries
            .iter()
            .map(|(topic, weakness)| (topic.to_string(), *weakness))
            .collect()
    }

    struct FailingProvider;

    #[async_trait]
    impl ResourceProvider for FailingProvider {
        async fn resources_for(&self, topic: &str) -> Result<Vec<Resource>, ProviderError> {
            if topic == "sql" {
                Err(ProviderError::LookupFailed("catalog unreachable".into()))
            } else {
                Ok(vec![Resource::new("Intro", format!("https://example.com/{topic}"))])
            }
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl ResourceProvider for SlowProvider {
        async fn resources_for(&self, _topic: &str) -> Result<Vec<Resource>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
    }

    // ==================== Ordering Tests ====================

    #[tokio::test]
    async fn topics_are_ranked_by_weakness_and_truncated() {
        let provider: Arc<dyn ResourceProvider> = Arc::new(StaticResourceProvider::new());
        let weaknesses = weaknesses(&[
            ("networking", 0.41),
            ("algorithms", 0.8),
            ("sql", 0.5),
        ]);
        let config = PlaylistConfig {
            max_topics: 2,
            ..PlaylistConfig::default()
        };

        let playlist = build_playlist(&weaknesses, provider, &config).await;

        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist[0].topic, "algorithms");
        assert_eq!(playlist[1].topic, "sql");
    }

    #[tokio::test]
    async fn equal_weakness_breaks_ties_lexically() {
        let provider: Arc<dyn ResourceProvider> = Arc::new(StaticResourceProvider::new());
        let weaknesses = weaknesses(&[("graphs", 0.5), ("arrays", 0.5)]);

        let playlist =
            build_playlist(&weaknesses, provider, &PlaylistConfig::default()).await;

        assert_eq!(playlist[0].topic, "arrays");
        assert_eq!(playlist[1].topic, "graphs");
    }

    // ==================== Failure Isolation Tests ====================

    #[tokio::test]
    async fn failed_lookup_keeps_its_slot_with_no_resources() {
        let provider: Arc<dyn ResourceProvider> = Arc::new(FailingProvider);
        let weaknesses = weaknesses(&[("algorithms", 0.8), ("sql", 0.5)]);

        let playlist =
            build_playlist(&weaknesses, provider, &PlaylistConfig::default()).await;

        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist[0].topic, "algorithms");
        assert_eq!(playlist[0].resources.len(), 1);
        assert_eq!(playlist[1].topic, "sql");
        assert!(playlist[1].resources.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_times_out_with_no_resources() {
        let provider: Arc<dyn ResourceProvider> = Arc::new(SlowProvider);
        let weaknesses = weaknesses(&[("sql", 0.5)]);
        let config = PlaylistConfig {
            lookup_timeout_ms: 50,
            ..PlaylistConfig::default()
        };

        let playlist = build_playlist(&weaknesses, provider, &config).await;

        assert_eq!(playlist.len(), 1);
        assert!(playlist[0].resources.is_empty());
    }

    // ==================== Dedup and Cap Tests ====================

    #[tokio::test]
    async fn duplicate_urls_are_dropped_keeping_first() {
        let provider: Arc<dyn ResourceProvider> =
            Arc::new(StaticResourceProvider::new().with_topic(
                "sql",
                vec![
                    Resource::new("First", "https://example.com/a"),
                    Resource::new("Duplicate", "https://example.com/a"),
                    Resource::new("Second", "https://example.com/b"),
                ],
            ));
        let weaknesses = weaknesses(&[("sql", 0.5)]);

        let playlist =
            build_playlist(&weaknesses, provider, &PlaylistConfig::default()).await;

        let resources = &playlist[0].resources;
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].title, "First");
        assert_eq!(resources[1].title, "Second");
    }

    #[tokio::test]
    async fn resources_are_capped_per_topic() {
        let many: Vec<Resource> = (0..10)
            .map(|i| Resource::new(format!("R{i}"), format!("https://example.com/{i}")))
            .collect();
        let provider: Arc<dyn ResourceProvider> =
            Arc::new(StaticResourceProvider::new().with_topic("sql", many));
        let weaknesses = weaknesses(&[("sql", 0.5)]);
        let config = PlaylistConfig {
            max_resources_per_topic: 3,
            ..PlaylistConfig::default()
        };

        let playlist = build_playlist(&weaknesses, provider, &config).await;

        assert_eq!(playlist[0].resources.len(), 3);
    }

    #[tokio::test]
    async fn empty_weakness_map_yields_empty_playlist() {
        let provider: Arc<dyn ResourceProvider> = Arc::new(StaticResourceProvider::new());

        let playlist =
            build_playlist(&WeaknessMap::default(), provider, &PlaylistConfig::default()).await;

        assert!(playlist.is_empty());
    }

    #[test]
    fn config_defaults_apply_on_partial_deserialization() {
        let config: PlaylistConfig = serde_json::from_str(r#"{"max_topics": 3}"#).unwrap();
        assert_eq!(config.max_topics, 3);
        assert_eq!(config.max_resources_per_topic, 5);
        assert_eq!(config.lookup_timeout_ms, 5000);
    }
}
