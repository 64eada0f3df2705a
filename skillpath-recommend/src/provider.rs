//! Learning resource providers
//!
//! A [`ResourceProvider`] maps a weakness topic to learning resources.
//! Providers are expected to be remote (content catalogs, search APIs),
//! so the trait is async and fallible per topic. [`StaticResourceProvider`]
//! serves a fixed in-memory catalog for tests and offline use.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single learning resource recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Human-readable title
    pub title: String,
    /// Link to the resource
    pub url: String,
}

impl Resource {
    /// Create a resource.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Errors from resource lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Resource lookup failed: {0}")]
    LookupFailed(String),
}

/// Source of learning resources for weakness topics.
///
/// A failed or slow lookup for one topic must not poison the others;
/// the playlist builder isolates each call.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Fetch resources for a single topic.
    ///
    /// An unknown topic is not an error; return an empty list.
    async fn resources_for(&self, topic: &str) -> Result<Vec<Resource>, ProviderError>;
}

/// Fixed in-memory resource catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceProvider {
    catalog: HashMap<String, Vec<Resource>>,
}

impl StaticResourceProvider {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the resources for a topic.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>, resources: Vec<Resource>) -> Self {
        self.catalog.insert(topic.into(), resources);
        self
    }
}

#[async_trait]
impl ResourceProvider for StaticResourceProvider {
    async fn resources_for(&self, topic: &str) -> Result<Vec<Resource>, ProviderError> {
        Ok(self.catalog.get(topic).cloned().unwrap_or_default())
    }
}
