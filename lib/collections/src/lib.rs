//! Collection results and asset details for the asset portal.
//!
//! This crate provides:
//! - `CollectionsDatasource`: a collection exposed as a single results page,
//!   with card resolution and selection events
//! - `AssetDetailsPanel`: the quick preview panel with previous/next
//!   navigation
//! - `CollectionSource` and `AssetMetadataSource`: seams to the asset
//!   repository, with in-memory implementations
//!
//! Controllers return [`AssetEvent`]s rather than dispatching them.

pub mod datasource;
pub mod details;
pub mod error;
pub mod event;
pub mod memory;
pub mod source;

pub use datasource::{ASSET_ID_PARAM, CollectionsDatasource, ResultsPage};
pub use details::{AssetDetailsPanel, ListNavigator, NavigationState, ResultsNavigator};
pub use error::CollectionError;
pub use event::AssetEvent;
pub use memory::{InMemoryCollections, InMemoryMetadata};
pub use source::{
    AssetMetadata, AssetMetadataSource, AssetSummary, Collection, CollectionItem, CollectionSource,
};
