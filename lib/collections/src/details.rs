//! Asset details panel controller.
//!
//! The panel shows one asset at a time. Opening an unknown asset is a no-op;
//! the previously shown asset stays in place.

use asset_portal_core::{AssetId, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::CollectionError;
use crate::event::AssetEvent;
use crate::source::{AssetMetadataSource, AssetSummary};

/// Whether the previous and next buttons are usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

/// Neighbour lookup within the current results.
#[async_trait]
pub trait ResultsNavigator: Send + Sync {
    fn has_previous(&self, current: &AssetId) -> bool;

    fn has_next(&self, current: &AssetId) -> bool;

    async fn previous_asset(&self, current: &AssetId) -> Option<AssetId>;

    async fn next_asset(&self, current: &AssetId) -> Option<AssetId>;
}

/// Navigator over a fixed, ordered list of assets.
#[derive(Debug, Clone, Default)]
pub struct ListNavigator {
    assets: Vec<AssetId>,
}

impl ListNavigator {
    #[must_use]
    pub fn new(assets: Vec<AssetId>) -> Self {
        Self { assets }
    }

    fn position(&self, current: &AssetId) -> Option<usize> {
        self.assets.iter().position(|asset| asset == current)
    }
}

#[async_trait]
impl ResultsNavigator for ListNavigator {
    fn has_previous(&self, current: &AssetId) -> bool {
        self.position(current).is_some_and(|index| index > 0)
    }

    fn has_next(&self, current: &AssetId) -> bool {
        self.position(current)
            .is_some_and(|index| index + 1 < self.assets.len())
    }

    async fn previous_asset(&self, current: &AssetId) -> Option<AssetId> {
        let index = self.position(current)?.checked_sub(1)?;
        self.assets.get(index).cloned()
    }

    async fn next_asset(&self, current: &AssetId) -> Option<AssetId> {
        let index = self.position(current)? + 1;
        self.assets.get(index).cloned()
    }
}

/// Quick preview panel for a single asset.
pub struct AssetDetailsPanel {
    metadata: Arc<dyn AssetMetadataSource>,
    navigator: Arc<dyn ResultsNavigator>,
    current: Option<AssetSummary>,
    open: bool,
    navigation: NavigationState,
}

impl AssetDetailsPanel {
    #[must_use]
    pub fn new(
        metadata: Arc<dyn AssetMetadataSource>,
        navigator: Arc<dyn ResultsNavigator>,
    ) -> Self {
        Self {
            metadata,
            navigator,
            current: None,
            open: false,
            navigation: NavigationState::default(),
        }
    }

    /// Replaces the navigator, e.g. after the results changed.
    pub fn set_navigator(&mut self, navigator: Arc<dyn ResultsNavigator>) {
        self.navigator = navigator;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The asset shown, if any. Kept after `close`.
    #[must_use]
    pub fn current(&self) -> Option<&AssetSummary> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    /// Opens the panel on `asset_id`.
    ///
    /// Returns `None` and leaves the panel unchanged when the id is empty or
    /// the asset has no metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata source fails.
    #[instrument(skip(self), fields(asset = %asset_id))]
    pub async fn open(
        &mut self,
        asset_id: &AssetId,
    ) -> Result<Option<AssetEvent>, CollectionError> {
        if asset_id.as_str().is_empty() {
            return Ok(None);
        }

        let Some(metadata) = self.metadata.asset_metadata(asset_id).await? else {
            debug!("no metadata, panel unchanged");
            return Ok(None);
        };

        let summary = AssetSummary::from_metadata(asset_id.clone(), &metadata);
        self.navigation = NavigationState {
            previous_enabled: self.navigator.has_previous(asset_id),
            next_enabled: self.navigator.has_next(asset_id),
        };
        let event = AssetEvent::QuickPreviewOpened {
            asset_id: asset_id.clone(),
            asset_name: summary.name.clone(),
        };
        self.current = Some(summary);
        self.open = true;
        Ok(Some(event))
    }

    /// Closes the panel.
    pub fn close(&mut self) -> AssetEvent {
        self.open = false;
        AssetEvent::QuickPreviewClosed {
            asset_id: self.current_id(),
        }
    }

    /// Requests the previous asset and opens it when there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata source fails.
    pub async fn previous(&mut self) -> Result<Vec<AssetEvent>, CollectionError> {
        let Some(current) = self.current_id() else {
            return Ok(Vec::new());
        };
        let mut events = vec![AssetEvent::PreviousAssetRequested {
            asset_id: current.clone(),
        }];
        if let Some(previous) = self.navigator.previous_asset(&current).await {
            events.extend(self.open(&previous).await?);
        }
        Ok(events)
    }

    /// Requests the next asset and opens it when there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata source fails.
    pub async fn next(&mut self) -> Result<Vec<AssetEvent>, CollectionError> {
        let Some(current) = self.current_id() else {
            return Ok(Vec::new());
        };
        let mut events = vec![AssetEvent::NextAssetRequested {
            asset_id: current.clone(),
        }];
        if let Some(next) = self.navigator.next_asset(&current).await {
            events.extend(self.open(&next).await?);
        }
        Ok(events)
    }

    fn current_id(&self) -> Option<AssetId> {
        self.current.as_ref().map(|summary| summary.asset_id.clone())
    }
}

impl std::fmt::Debug for AssetDetailsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetDetailsPanel")
            .field("current", &self.current)
            .field("open", &self.open)
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryMetadata;
    use crate::source::AssetMetadata;
    use serde_json::json;

    fn asset(name: &str) -> AssetMetadata {
        AssetMetadata::new(json!({"repositoryMetadata": {"repo:name": name}}))
    }

    fn ids(raw: &[&str]) -> Vec<AssetId> {
        raw.iter().map(|id| AssetId::new(*id)).collect()
    }

    fn panel() -> AssetDetailsPanel {
        let metadata = InMemoryMetadata::default()
            .with("a", asset("a.jpg"))
            .with("b", asset("b.jpg"))
            .with("c", asset("c.jpg"));
        AssetDetailsPanel::new(
            Arc::new(metadata),
            Arc::new(ListNavigator::new(ids(&["a", "b", "c"]))),
        )
    }

    #[tokio::test]
    async fn open_shows_asset_and_navigation() {
        let mut panel = panel();

        let event = panel.open(&AssetId::new("a")).await.expect("open");

        assert_eq!(
            event,
            Some(AssetEvent::QuickPreviewOpened {
                asset_id: AssetId::new("a"),
                asset_name: "a.jpg".to_string(),
            })
        );
        assert!(panel.is_open());
        assert_eq!(
            panel.navigation(),
            NavigationState {
                previous_enabled: false,
                next_enabled: true,
            }
        );
    }

    #[tokio::test]
    async fn open_unknown_asset_leaves_panel_unchanged() {
        let mut panel = panel();
        panel.open(&AssetId::new("b")).await.expect("open");

        let event = panel.open(&AssetId::new("missing")).await.expect("open");

        assert!(event.is_none());
        assert_eq!(
            panel.current().map(|summary| summary.asset_id.as_str()),
            Some("b")
        );
        assert!(panel.open(&AssetId::new("")).await.expect("open").is_none());
    }

    #[tokio::test]
    async fn close_reports_current_asset() {
        let mut panel = panel();
        panel.open(&AssetId::new("c")).await.expect("open");

        let event = panel.close();

        assert!(!panel.is_open());
        assert_eq!(
            event,
            AssetEvent::QuickPreviewClosed {
                asset_id: Some(AssetId::new("c"))
            }
        );
    }

    #[tokio::test]
    async fn next_and_previous_move_through_results() {
        let mut panel = panel();
        panel.open(&AssetId::new("b")).await.expect("open");

        let events = panel.next().await.expect("next");
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            AssetEvent::NextAssetRequested {
                asset_id: AssetId::new("b")
            }
        );
        assert_eq!(
            panel.current().map(|summary| summary.asset_id.as_str()),
            Some("c")
        );
        assert!(!panel.navigation().next_enabled);

        let events = panel.next().await.expect("next at end");
        assert_eq!(events.len(), 1);

        panel.previous().await.expect("previous");
        assert_eq!(
            panel.current().map(|summary| summary.asset_id.as_str()),
            Some("b")
        );
    }

    #[tokio::test]
    async fn navigation_without_asset_is_noop() {
        let mut panel = panel();
        assert!(panel.next().await.expect("next").is_empty());
        assert!(panel.previous().await.expect("previous").is_empty());
    }
}
