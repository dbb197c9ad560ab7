//! Per-route role requirements.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Role;

/// Metadata key carrying the required role list.
pub const ROLES_KEY: &str = "roles";

/// Roles a navigation target declares as necessary for access.
///
/// Order is preserved as configured; an empty list means "authenticated
/// users only".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteRequirement {
    required_roles: Vec<Role>,
}

/// Problems found in route metadata.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataIssue {
    #[error("route metadata is not an object")]
    NotAnObject,

    #[error("'roles' is not a list")]
    NotAList,

    #[error("'roles' entry {index} is not a string")]
    NonStringRole { index: usize },
}

impl RouteRequirement {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            required_roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required_roles(&self) -> &[Role] {
        &self.required_roles
    }

    pub fn is_empty(&self) -> bool {
        self.required_roles.is_empty()
    }

    /// Strictly parse route metadata of the form `{"roles": ["Admin", ...]}`.
    ///
    /// Absent metadata, or an object without a `roles` key, yields an empty
    /// requirement.
    pub fn parse_metadata(data: Option<&Value>) -> Result<Self, MetadataIssue> {
        let Some(data) = data else {
            return Ok(Self::none());
        };
        let object = data.as_object().ok_or(MetadataIssue::NotAnObject)?;

        let roles = match object.get(ROLES_KEY) {
            None | Some(Value::Null) => return Ok(Self::none()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(MetadataIssue::NotAList),
        };

        let required_roles = roles
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str()
                    .map(|s| Role::new(s.to_owned()))
                    .ok_or(MetadataIssue::NonStringRole { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { required_roles })
    }

    /// Lenient variant of [`RouteRequirement::parse_metadata`]: malformed
    /// metadata is normalised to "no roles required".
    pub fn from_metadata(data: Option<&Value>) -> Self {
        Self::parse_metadata(data).unwrap_or_else(|issue| {
            tracing::warn!(%issue, "malformed route metadata; treating as no roles required");
            Self::none()
        })
    }
}

impl<R: Into<Role>> FromIterator<R> for RouteRequirement {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        Self::roles(iter)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn absent_metadata_requires_nothing() {
        assert_eq!(RouteRequirement::parse_metadata(None), Ok(RouteRequirement::none()));
        assert_eq!(
            RouteRequirement::parse_metadata(Some(&json!({}))),
            Ok(RouteRequirement::none())
        );
    }

    #[test]
    fn keeps_configured_order() {
        let req = RouteRequirement::parse_metadata(Some(&json!({"roles": ["Debt Officer", "Admin"]})))
            .unwrap();
        assert_eq!(req.required_roles(), &[Role::DEBT_OFFICER, Role::ADMIN]);
    }

    #[test]
    fn rejects_non_list_roles() {
        assert_eq!(
            RouteRequirement::parse_metadata(Some(&json!({"roles": "Admin"}))),
            Err(MetadataIssue::NotAList)
        );
        assert_eq!(
            RouteRequirement::parse_metadata(Some(&json!(["Admin"]))),
            Err(MetadataIssue::NotAnObject)
        );
    }

    #[test]
    fn reports_position_of_bad_entry() {
        assert_eq!(
            RouteRequirement::parse_metadata(Some(&json!({"roles": ["Admin", 7]}))),
            Err(MetadataIssue::NonStringRole { index: 1 })
        );
    }

    #[test]
    fn lenient_parse_normalises_to_empty() {
        let req = RouteRequirement::from_metadata(Some(&json!({"roles": {"Admin": true}})));
        assert!(req.is_empty());
    }
}
