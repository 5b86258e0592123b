//! Events emitted by the collection controllers.
//!
//! Controllers return events instead of dispatching them; the caller forwards
//! them to whatever event bus the page uses.

use asset_portal_core::AssetId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum AssetEvent {
    #[serde(rename_all = "camelCase")]
    AssetSelected { asset_id: AssetId },
    #[serde(rename_all = "camelCase")]
    AssetDeselected { asset_id: AssetId },
    #[serde(rename_all = "camelCase")]
    QuickPreviewOpened { asset_id: AssetId, asset_name: String },
    #[serde(rename_all = "camelCase")]
    QuickPreviewClosed { asset_id: Option<AssetId> },
    #[serde(rename_all = "camelCase")]
    PreviousAssetRequested { asset_id: AssetId },
    #[serde(rename_all = "camelCase")]
    NextAssetRequested { asset_id: AssetId },
}

impl AssetEvent {
    /// Returns the asset the event refers to, if any.
    #[must_use]
    pub fn asset_id(&self) -> Option<&AssetId> {
        match self {
            Self::AssetSelected { asset_id }
            | Self::AssetDeselected { asset_id }
            | Self::QuickPreviewOpened { asset_id, .. }
            | Self::PreviousAssetRequested { asset_id }
            | Self::NextAssetRequested { asset_id } => Some(asset_id),
            Self::QuickPreviewClosed { asset_id } => asset_id.as_ref(),
        }
    }
}
