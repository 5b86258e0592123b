//! In-memory sources.
//!
//! Useful for previews and tests where the asset repository is not reachable.

use asset_portal_core::{AssetId, CollectionId, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::CollectionError;
use crate::source::{AssetMetadata, AssetMetadataSource, Collection, CollectionSource};

/// Collections held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollections {
    collections: HashMap<CollectionId, Collection>,
    failure: Option<String>,
}

impl InMemoryCollections {
    /// Adds a collection, replacing one with the same id.
    #[must_use]
    pub fn with(mut self, collection: Collection) -> Self {
        self.collections.insert(collection.id.clone(), collection);
        self
    }

    /// A source whose every lookup fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            collections: HashMap::new(),
            failure: Some("collection source unavailable".to_string()),
        }
    }
}

#[async_trait]
impl CollectionSource for InMemoryCollections {
    async fn collection(
        &self,
        id: &CollectionId,
    ) -> Result<Option<Collection>, CollectionError> {
        if let Some(reason) = &self.failure {
            return Err(CollectionError::SourceFailed {
                collection_id: id.clone(),
                reason: reason.clone(),
            }
            .into());
        }
        Ok(self.collections.get(id).cloned())
    }
}

/// Asset metadata held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadata {
    assets: HashMap<AssetId, AssetMetadata>,
}

impl InMemoryMetadata {
    /// Adds metadata for an asset.
    #[must_use]
    pub fn with(mut self, asset_id: impl Into<AssetId>, metadata: AssetMetadata) -> Self {
        self.assets.insert(asset_id.into(), metadata);
        self
    }
}

#[async_trait]
impl AssetMetadataSource for InMemoryMetadata {
    async fn asset_metadata(
        &self,
        id: &AssetId,
    ) -> Result<Option<AssetMetadata>, CollectionError> {
        Ok(self.assets.get(id).cloned())
    }
}
