//! Strongly-typed identifiers for portal entities.
//!
//! Asset and collection identifiers are opaque strings issued by the asset
//! repository (for example `urn:aaid:aem:6a3f...`). IMS organization
//! identifiers carry an `@AdobeOrg` suffix that the identity service omits in
//! its organization records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed wrapper around an opaque string ID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from a string without validation.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: "identifier is empty".to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of an asset in the repository.
    AssetId
);

define_id!(
    /// Identifier of an asset collection.
    CollectionId
);

define_id!(
    /// Identifier of an IMS organization, usually of the form `ABC123@AdobeOrg`.
    ImsOrgId
);

/// Suffix IMS appends to organization identifiers in client configuration.
pub const ADOBE_ORG_SUFFIX: &str = "@AdobeOrg";

impl CollectionId {
    /// Recovers a collection ID from the last path segment of a portal URL.
    ///
    /// Portal URLs encode the `:` separators of collection URNs as `_`.
    #[must_use]
    pub fn from_url_segment(segment: &str) -> Self {
        Self(segment.replace('_', ":"))
    }
}

impl ImsOrgId {
    /// Returns the identifier as it appears in `orgRef.ident` of organization
    /// records, with the `@AdobeOrg` marker removed.
    #[must_use]
    pub fn ident(&self) -> String {
        self.0.replace(ADOBE_ORG_SUFFIX, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_display_is_raw_value() {
        let id = AssetId::new("urn:aaid:aem:1234");
        assert_eq!(id.to_string(), "urn:aaid:aem:1234");
        assert_eq!(id.as_str(), "urn:aaid:aem:1234");
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: AssetId = "  urn:aaid:aem:1234 \n".parse().expect("should parse");
        assert_eq!(id.as_str(), "urn:aaid:aem:1234");
    }

    #[test]
    fn parse_rejects_empty() {
        let result: Result<CollectionId, _> = "   ".parse();
        let err = result.expect_err("empty id must fail");
        assert_eq!(err.id_type, "CollectionId");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn collection_id_from_url_segment() {
        let id = CollectionId::from_url_segment("urn_aaid_sc_US_0a1b");
        assert_eq!(id.as_str(), "urn:aaid:sc:US:0a1b");
    }

    #[test]
    fn org_ident_strips_suffix() {
        let org = ImsOrgId::new("ABC123@AdobeOrg");
        assert_eq!(org.ident(), "ABC123");
    }

    #[test]
    fn org_ident_without_suffix_is_unchanged() {
        let org = ImsOrgId::new("ABC123");
        assert_eq!(org.ident(), "ABC123");
    }

    #[test]
    fn id_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(AssetId::new("a"));
        set.insert(AssetId::new("b"));
        set.insert(AssetId::new("a"));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serializes_transparently() {
        let id = AssetId::new("urn:aaid:aem:1234");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"urn:aaid:aem:1234\"");
    }
}
