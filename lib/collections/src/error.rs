//! Error types for the collections crate.

use asset_portal_core::{AssetId, CollectionId};
use std::fmt;

/// Errors from collection and metadata sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// The collection source failed.
    SourceFailed {
        collection_id: CollectionId,
        reason: String,
    },
    /// The asset metadata source failed.
    MetadataFailed { asset_id: AssetId, reason: String },
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceFailed {
                collection_id,
                reason,
            } => {
                write!(f, "failed to load collection '{collection_id}': {reason}")
            }
            Self::MetadataFailed { asset_id, reason } => {
                write!(f, "failed to load metadata for asset '{asset_id}': {reason}")
            }
        }
    }
}

impl std::error::Error for CollectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CollectionError::SourceFailed {
            collection_id: CollectionId::new("urn:collection:1"),
            reason: "timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load collection 'urn:collection:1': timeout"
        );

        let err = CollectionError::MetadataFailed {
            asset_id: AssetId::new("urn:aaid:aem:1"),
            reason: "forbidden".to_string(),
        };
        assert!(err.to_string().contains("urn:aaid:aem:1"));
    }
}
