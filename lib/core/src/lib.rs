//! Core domain types and utilities for the asset portal.
//!
//! This crate provides the identifiers and error handling foundation shared by
//! the access guard, the collection datasource and the command-line tools.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ADOBE_ORG_SUFFIX, AssetId, CollectionId, ImsOrgId, ParseIdError};
