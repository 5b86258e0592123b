//! Results datasource backed by a single collection.
//!
//! A collection is shown as one page of results. There is no pagination:
//! `show_more` yields nothing and every page is the last.

use asset_portal_core::{AssetId, CollectionId, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::CollectionError;
use crate::event::AssetEvent;
use crate::source::{AssetMetadataSource, AssetSummary, CollectionItem, CollectionSource};

/// Query or anchor parameter naming the asset to select initially.
pub const ASSET_ID_PARAM: &str = "assetId";

/// One page of results handed to the results container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPage {
    pub items: Vec<CollectionItem>,
    pub offset: usize,
    pub is_last_page: bool,
}

impl ResultsPage {
    /// Asset ids of the page, in order.
    #[must_use]
    pub fn asset_ids(&self) -> Vec<AssetId> {
        self.items.iter().map(|item| item.asset_id.clone()).collect()
    }
}

/// Datasource listing the assets of one collection.
pub struct CollectionsDatasource {
    collections: Arc<dyn CollectionSource>,
    metadata: Arc<dyn AssetMetadataSource>,
    collection_id: Option<CollectionId>,
    page: Option<ResultsPage>,
}

impl CollectionsDatasource {
    #[must_use]
    pub fn new(
        collections: Arc<dyn CollectionSource>,
        metadata: Arc<dyn AssetMetadataSource>,
    ) -> Self {
        Self {
            collections,
            metadata,
            collection_id: None,
            page: None,
        }
    }

    /// The collection currently shown.
    #[must_use]
    pub fn collection_id(&self) -> Option<&CollectionId> {
        self.collection_id.as_ref()
    }

    /// The page currently shown.
    #[must_use]
    pub fn page(&self) -> Option<&ResultsPage> {
        self.page.as_ref()
    }

    /// Loads the collection for first display.
    ///
    /// Returns `None` and leaves the datasource untouched when the collection
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection source fails.
    #[instrument(skip(self), fields(collection = %collection_id))]
    pub async fn register(
        &mut self,
        collection_id: CollectionId,
    ) -> Result<Option<ResultsPage>, CollectionError> {
        let Some(page) = self.fetch_page(&collection_id).await? else {
            debug!("collection not found");
            return Ok(None);
        };
        self.collection_id = Some(collection_id);
        self.page = Some(page.clone());
        Ok(Some(page))
    }

    /// Switches to another collection.
    ///
    /// The datasource points at `collection_id` afterwards even if the
    /// collection does not exist; in that case it shows no page.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection source fails.
    #[instrument(skip(self), fields(collection = %collection_id))]
    pub async fn load_collection(
        &mut self,
        collection_id: CollectionId,
    ) -> Result<Option<ResultsPage>, CollectionError> {
        self.collection_id = Some(collection_id.clone());
        self.page = self.fetch_page(&collection_id).await?;
        Ok(self.page.clone())
    }

    /// Collections are a single page.
    #[must_use]
    pub fn show_more(&self) -> Option<ResultsPage> {
        None
    }

    #[must_use]
    pub fn is_last_page(&self) -> bool {
        true
    }

    /// Resolves the card shown for `item`.
    ///
    /// Returns `None` when the asset has no metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata source fails.
    pub async fn item_card(
        &self,
        item: &CollectionItem,
    ) -> Result<Option<AssetSummary>, CollectionError> {
        let metadata = self.metadata.asset_metadata(&item.asset_id).await?;
        Ok(metadata.map(|metadata| AssetSummary::from_metadata(item.asset_id.clone(), &metadata)))
    }

    #[must_use]
    pub fn item_id<'a>(&self, item: &'a CollectionItem) -> &'a AssetId {
        &item.asset_id
    }

    /// Card actions hidden for collection results.
    #[must_use]
    pub fn excluded_item_actions(&self) -> &'static [&'static str] {
        &[]
    }

    #[must_use]
    pub fn no_results_message(&self) -> &'static str {
        "No assets found in this collection."
    }

    #[must_use]
    pub fn not_found_message(&self) -> &'static str {
        "Collection not found."
    }

    /// Picks the asset to select on load: the `assetId` query parameter,
    /// then the anchor parameter. Empty values are ignored.
    #[must_use]
    pub fn item_id_to_select(&self, query: Option<&str>, anchor: Option<&str>) -> Option<AssetId> {
        query
            .filter(|value| !value.is_empty())
            .or_else(|| anchor.filter(|value| !value.is_empty()))
            .map(AssetId::from)
    }

    /// Events for a selected item.
    #[must_use]
    pub fn on_item_selected(&self, asset_id: &AssetId) -> Vec<AssetEvent> {
        vec![AssetEvent::AssetSelected {
            asset_id: asset_id.clone(),
        }]
    }

    /// Events for a deselected item; the quick preview closes first.
    #[must_use]
    pub fn on_item_deselected(&self, asset_id: &AssetId) -> Vec<AssetEvent> {
        vec![
            AssetEvent::QuickPreviewClosed {
                asset_id: Some(asset_id.clone()),
            },
            AssetEvent::AssetDeselected {
                asset_id: asset_id.clone(),
            },
        ]
    }

    async fn fetch_page(
        &self,
        collection_id: &CollectionId,
    ) -> Result<Option<ResultsPage>, CollectionError> {
        let collection = self.collections.collection(collection_id).await?;
        Ok(collection.map(|collection| {
            debug!(items = collection.items.len(), "loaded collection");
            ResultsPage {
                items: collection.items,
                offset: 0,
                is_last_page: true,
            }
        }))
    }
}

impl std::fmt::Debug for CollectionsDatasource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionsDatasource")
            .field("collection_id", &self.collection_id)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryCollections, InMemoryMetadata};
    use crate::source::{AssetMetadata, Collection};
    use serde_json::json;

    fn datasource() -> CollectionsDatasource {
        let collections = InMemoryCollections::default().with(Collection {
            id: CollectionId::new("urn:collection:spring"),
            title: Some("Spring".to_string()),
            items: vec![
                CollectionItem::new("urn:aaid:aem:1"),
                CollectionItem::new("urn:aaid:aem:2"),
            ],
        });
        let metadata = InMemoryMetadata::default().with(
            "urn:aaid:aem:1",
            AssetMetadata::new(json!({
                "repositoryMetadata": {"repo:name": "hero.jpg", "dc:format": "image/jpeg"},
                "assetMetadata": {"dc:title": "Hero"}
            })),
        );
        CollectionsDatasource::new(Arc::new(collections), Arc::new(metadata))
    }

    #[tokio::test]
    async fn register_yields_single_page() {
        let mut datasource = datasource();

        let page = datasource
            .register(CollectionId::from_url_segment("urn_collection_spring"))
            .await
            .expect("register")
            .expect("page");

        assert_eq!(
            page.asset_ids(),
            vec![AssetId::new("urn:aaid:aem:1"), AssetId::new("urn:aaid:aem:2")]
        );
        assert_eq!(page.offset, 0);
        assert!(page.is_last_page);
        assert_eq!(
            datasource.collection_id().map(CollectionId::as_str),
            Some("urn:collection:spring")
        );
        assert!(datasource.show_more().is_none());
        assert!(datasource.is_last_page());
    }

    #[tokio::test]
    async fn register_unknown_collection_leaves_state() {
        let mut datasource = datasource();

        let page = datasource
            .register(CollectionId::new("urn:collection:missing"))
            .await
            .expect("register");

        assert!(page.is_none());
        assert!(datasource.collection_id().is_none());
        assert!(datasource.page().is_none());
    }

    #[tokio::test]
    async fn load_collection_switches_collection() {
        let mut datasource = datasource();
        datasource
            .register(CollectionId::new("urn:collection:spring"))
            .await
            .expect("register");

        let page = datasource
            .load_collection(CollectionId::new("urn:collection:missing"))
            .await
            .expect("load");

        assert!(page.is_none());
        assert!(datasource.page().is_none());
        assert_eq!(
            datasource.collection_id().map(CollectionId::as_str),
            Some("urn:collection:missing")
        );
    }

    #[tokio::test]
    async fn item_card_uses_metadata() {
        let datasource = datasource();

        let card = datasource
            .item_card(&CollectionItem::new("urn:aaid:aem:1"))
            .await
            .expect("card")
            .expect("metadata present");
        assert_eq!(card.name, "hero.jpg");
        assert_eq!(card.title, "Hero");
        assert_eq!(card.mime_type.as_deref(), Some("image/jpeg"));

        let missing = datasource
            .item_card(&CollectionItem::new("urn:aaid:aem:2"))
            .await
            .expect("card");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn source_failure_propagates() {
        let mut datasource = CollectionsDatasource::new(
            Arc::new(InMemoryCollections::failing()),
            Arc::new(InMemoryMetadata::default()),
        );

        assert!(
            datasource
                .register(CollectionId::new("urn:collection:spring"))
                .await
                .is_err()
        );
    }

    #[test]
    fn fixed_messages_and_actions() {
        let datasource = datasource();
        assert_eq!(
            datasource.no_results_message(),
            "No assets found in this collection."
        );
        assert_eq!(datasource.not_found_message(), "Collection not found.");
        assert!(datasource.excluded_item_actions().is_empty());

        let item = CollectionItem::new("urn:aaid:aem:9");
        assert_eq!(datasource.item_id(&item).as_str(), "urn:aaid:aem:9");
    }

    #[test]
    fn item_to_select_prefers_query() {
        let datasource = datasource();
        assert_eq!(
            datasource.item_id_to_select(Some("q"), Some("a")),
            Some(AssetId::new("q"))
        );
        assert_eq!(
            datasource.item_id_to_select(Some(""), Some("a")),
            Some(AssetId::new("a"))
        );
        assert_eq!(datasource.item_id_to_select(None, None), None);
    }

    #[test]
    fn selection_events() {
        let datasource = datasource();
        let id = AssetId::new("urn:aaid:aem:1");

        assert_eq!(
            datasource.on_item_selected(&id),
            vec![AssetEvent::AssetSelected {
                asset_id: id.clone()
            }]
        );
        assert_eq!(
            datasource.on_item_deselected(&id),
            vec![
                AssetEvent::QuickPreviewClosed {
                    asset_id: Some(id.clone())
                },
                AssetEvent::AssetDeselected { asset_id: id },
            ]
        );
    }
}
