//! Collection and asset metadata sources.
//!
//! Sources are the seams to the asset repository. Both report "not found" as
//! `Ok(None)` and reserve errors for failed lookups.

use asset_portal_core::{AssetId, CollectionId, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::CollectionError;

/// A named list of assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<CollectionItem>,
}

/// One entry of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    pub asset_id: AssetId,
}

impl CollectionItem {
    #[must_use]
    pub fn new(asset_id: impl Into<AssetId>) -> Self {
        Self {
            asset_id: asset_id.into(),
        }
    }
}

/// Asset metadata as returned by the repository.
///
/// The document is kept as raw JSON; only the handful of fields the portal
/// displays have typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetMetadata(JsonValue);

impl AssetMetadata {
    #[must_use]
    pub fn new(document: JsonValue) -> Self {
        Self(document)
    }

    /// Returns the raw document.
    #[must_use]
    pub fn raw(&self) -> &JsonValue {
        &self.0
    }

    /// File name (`repositoryMetadata["repo:name"]`).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0["repositoryMetadata"]["repo:name"].as_str()
    }

    /// Display title (`assetMetadata["dc:title"]`), falling back to the file name.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.0["assetMetadata"]["dc:title"]
            .as_str()
            .filter(|title| !title.is_empty())
            .or_else(|| self.name())
    }

    /// MIME type (`repositoryMetadata["dc:format"]`).
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.0["repositoryMetadata"]["dc:format"].as_str()
    }
}

/// What a card or the details panel shows for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub asset_id: AssetId,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl AssetSummary {
    /// Builds a summary from metadata. Missing names become empty strings.
    #[must_use]
    pub fn from_metadata(asset_id: AssetId, metadata: &AssetMetadata) -> Self {
        Self {
            asset_id,
            name: metadata.name().unwrap_or_default().to_string(),
            title: metadata.title().unwrap_or_default().to_string(),
            mime_type: metadata.mime_type().map(str::to_string),
        }
    }
}

/// Looks up collections.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Returns the collection, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn collection(
        &self,
        id: &CollectionId,
    ) -> Result<Option<Collection>, CollectionError>;
}

/// Looks up asset metadata.
#[async_trait]
pub trait AssetMetadataSource: Send + Sync {
    /// Returns the asset's metadata, or `None` if the asset is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn asset_metadata(
        &self,
        id: &AssetId,
    ) -> Result<Option<AssetMetadata>, CollectionError>;
}
