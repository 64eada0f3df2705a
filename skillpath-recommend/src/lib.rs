//! skillpath-recommend: Recommendation engine for the skillpath assessment platform
//!
//! Consumes the weakness maps produced by `skillpath-core` and builds
//! per-student learning playlists:
//!
//! - **Providers** - [`ResourceProvider`] trait for topic-to-resource lookup,
//!   with [`StaticResourceProvider`] for fixed catalogs
//! - **Playlists** - [`build_playlist`] ranks weak topics and fetches
//!   resources concurrently with per-topic failure isolation
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use skillpath_recommend::{
//!     PlaylistConfig, Resource, ResourceProvider, StaticResourceProvider, build_playlist,
//! };
//! use skillpath_core::WeaknessMap;
//!
//! # async fn example(weaknesses: WeaknessMap) {
//! let provider: Arc<dyn ResourceProvider> = Arc::new(
//!     StaticResourceProvider::new()
//!         .with_topic("sql", vec![Resource::new("Joins", "https://example.com/joins")]),
//! );
//!
//! let playlist = build_playlist(&weaknesses, provider, &PlaylistConfig::default()).await;
//! for entry in &playlist {
//!     println!("{}: {} resources", entry.topic, entry.resources.len());
//! }
//! # }
//! ```

pub mod playlist;
pub mod provider;

// Re-export key types for convenience
pub use playlist::{PlaylistConfig, PlaylistEntry, build_playlist};
pub use provider::{ProviderError, Resource, ResourceProvider, StaticResourceProvider};
