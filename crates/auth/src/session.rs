//! Session snapshot consumed by authorization decisions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Role;

/// User profile as returned by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Current user's authentication status and role claims.
///
/// A `Session` is a read-only snapshot. The identity provider owns the live
/// session; callers take a fresh snapshot per navigation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub roles: BTreeSet<Role>,
    pub username: Option<String>,
    pub profile: Option<Profile>,
}

impl Session {
    /// Unauthenticated session with no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            authenticated: true,
            roles: roles.into_iter().map(Into::into).collect(),
            username: None,
            profile: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Exact, case-sensitive membership test.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_nothing() {
        let s = Session::anonymous();
        assert!(!s.is_authenticated());
        assert!(s.roles().is_empty());
        assert!(s.username.is_none());
    }

    #[test]
    fn duplicate_roles_collapse() {
        let s = Session::authenticated(["Admin", "Admin", "Debt Officer"]);
        assert_eq!(s.roles().len(), 2);
        assert!(s.has_role("Admin"));
        assert!(!s.has_role("admin"));
    }

    #[test]
    fn profile_uses_provider_field_names() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "username": "jdoe",
            "firstName": "Jane",
            "lastName": "Doe"
        }))
        .unwrap();

        assert_eq!(profile.first_name.as_deref(), Some("Jane"));
        assert_eq!(profile.last_name.as_deref(), Some("Doe"));
        assert!(profile.email.is_none());
    }
}
