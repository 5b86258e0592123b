//! Organization membership records.
//!
//! The identity service returns one record per organization the user belongs
//! to. Access is decided on the groups of the configured organization only.

use asset_portal_core::ImsOrgId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// Reference to the organization a record describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgRef {
    /// Organization identifier without the `@AdobeOrg` suffix.
    pub ident: String,
    /// Authentication source, usually `AdobeOrg`.
    #[serde(default)]
    pub auth_src: Option<String>,
}

/// A security group the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    /// Group name.
    pub group_name: String,
    /// Numeric group identifier.
    #[serde(default)]
    pub ident: Option<u64>,
    /// The user's role in the group.
    #[serde(default)]
    pub role: Option<String>,
}

impl GroupRecord {
    /// Creates a group record with only a name.
    #[must_use]
    pub fn named(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            ident: None,
            role: None,
        }
    }
}

/// One organization the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    /// The organization.
    pub org_ref: OrgRef,
    /// Display name.
    #[serde(default)]
    pub org_name: Option<String>,
    /// Groups within the organization; absent when the user has none.
    #[serde(default, deserialize_with = "lenient_groups")]
    pub groups: Option<Vec<GroupRecord>>,
}

/// Decodes a group list entry by entry. Entries that are not group records
/// are dropped without affecting their siblings; a non-array list is absent.
fn lenient_groups<'de, D>(deserializer: D) -> Result<Option<Vec<GroupRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(JsonValue::Array(entries)) = Option::<JsonValue>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let groups = entries
        .into_iter()
        .filter_map(|entry| {
            serde_json::from_value::<GroupRecord>(entry)
                .map_err(|e| warn!(error = %e, "skipping malformed group record"))
                .ok()
        })
        .collect();
    Ok(Some(groups))
}

/// Decodes organization records from the identity service response.
///
/// Anything other than a JSON array yields no records. Array elements that
/// are not organization records are skipped.
#[must_use]
pub fn parse_organizations(document: &JsonValue) -> Vec<OrganizationRecord> {
    let Some(elements) = document.as_array() else {
        debug!("organization data is not an array");
        return Vec::new();
    };

    elements
        .iter()
        .filter_map(|element| {
            serde_json::from_value::<OrganizationRecord>(element.clone())
                .map_err(|e| warn!(error = %e, "skipping malformed organization record"))
                .ok()
        })
        .collect()
}

/// Returns the groups of `org_id` within `organizations`.
///
/// Empty when the organization is not present or has no groups.
#[must_use]
pub fn groups_for_org(organizations: &[OrganizationRecord], org_id: &ImsOrgId) -> Vec<GroupRecord> {
    let ident = org_id.ident();
    organizations
        .iter()
        .find(|record| record.org_ref.ident == ident)
        .and_then(|record| record.groups.clone())
        .unwrap_or_default()
}

/// Returns true if `groups` contains a group named `group_name`.
#[must_use]
pub fn is_member(groups: &[GroupRecord], group_name: &str) -> bool {
    groups.iter().any(|group| group.group_name == group_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT_GROUP: &str = "assets-distribution-portal-users";

    fn org() -> ImsOrgId {
        ImsOrgId::new("ABC123@AdobeOrg")
    }

    fn memberships(document: &JsonValue) -> Vec<GroupRecord> {
        groups_for_org(&parse_organizations(document), &org())
    }

    #[test]
    fn matching_org_with_group_grants_membership() {
        let document = json!([
            {"orgRef": {"ident": "ABC123"}, "groups": [{"groupName": DEFAULT_GROUP}]}
        ]);
        assert!(is_member(&memberships(&document), DEFAULT_GROUP));
    }

    #[test]
    fn non_matching_org_yields_no_groups() {
        let document = json!([
            {"orgRef": {"ident": "XYZ"}, "groups": [{"groupName": DEFAULT_GROUP}]}
        ]);
        assert!(memberships(&document).is_empty());
    }

    #[test]
    fn empty_array_yields_no_groups() {
        assert!(memberships(&json!([])).is_empty());
    }

    #[test]
    fn non_array_yields_no_groups() {
        assert!(memberships(&json!({"orgRef": {"ident": "ABC123"}})).is_empty());
        assert!(memberships(&JsonValue::Null).is_empty());
    }

    #[test]
    fn missing_groups_list_yields_no_groups() {
        let document = json!([{"orgRef": {"ident": "ABC123"}, "orgName": "Acme"}]);
        assert!(memberships(&document).is_empty());
    }

    #[test]
    fn other_group_is_not_membership() {
        let document = json!([
            {"orgRef": {"ident": "ABC123"}, "groups": [{"groupName": "other"}]}
        ]);
        assert!(!is_member(&memberships(&document), DEFAULT_GROUP));
    }

    #[test]
    fn malformed_records_are_skipped() {
        let document = json!([
            {"groups": [{"groupName": DEFAULT_GROUP}]},
            "garbage",
            {"orgRef": {"ident": "ABC123", "authSrc": "AdobeOrg"},
             "groups": [{"groupName": DEFAULT_GROUP, "ident": 42, "role": "GRP_MEMBER"}]}
        ]);

        let organizations = parse_organizations(&document);
        assert_eq!(organizations.len(), 1);
        assert_eq!(organizations[0].org_ref.auth_src.as_deref(), Some("AdobeOrg"));

        let groups = groups_for_org(&organizations, &org());
        assert_eq!(groups[0].ident, Some(42));
        assert!(is_member(&groups, DEFAULT_GROUP));
    }

    #[test]
    fn malformed_sibling_group_keeps_membership() {
        let document = json!([
            {"orgRef": {"ident": "ABC123"},
             "groups": [
                {"groupName": DEFAULT_GROUP, "ident": 1},
                {"groupName": "legacy", "ident": "g-77"},
                {"ident": 7}
             ]}
        ]);

        let groups = memberships(&document);
        assert_eq!(groups.len(), 1);
        assert!(is_member(&groups, DEFAULT_GROUP));
    }

    #[test]
    fn non_array_group_list_yields_no_groups() {
        let document = json!([
            {"orgRef": {"ident": "ABC123"}, "groups": {"groupName": DEFAULT_GROUP}}
        ]);
        let organizations = parse_organizations(&document);
        assert_eq!(organizations.len(), 1);
        assert!(groups_for_org(&organizations, &org()).is_empty());
    }

    #[test]
    fn first_matching_record_wins() {
        let document = json!([
            {"orgRef": {"ident": "ABC123"}, "groups": [{"groupName": "first"}]},
            {"orgRef": {"ident": "ABC123"}, "groups": [{"groupName": "second"}]}
        ]);
        assert_eq!(memberships(&document), vec![GroupRecord::named("first")]);
    }
}
