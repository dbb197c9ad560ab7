use serde::Serialize;

use crate::{Role, RouteRequirement, Session};

/// Outcome of a route authorization check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationVerdict {
    /// Navigation proceeds.
    Allow,
    /// No authenticated session; the caller must start the login flow and
    /// abandon the current navigation.
    RequireLogin,
    /// Authenticated, but at least one required role is missing.
    Deny,
}

impl AuthorizationVerdict {
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Decide whether a session may enter a route.
///
/// - No IO
/// - No panics
/// - Every required role must be held (AND, never OR)
pub fn evaluate(requirement: &RouteRequirement, session: &Session) -> AuthorizationVerdict {
    evaluate_roles(Some(requirement.required_roles()), session)
}

/// Same as [`evaluate`] for a raw role list; `None` counts as "no roles".
pub fn evaluate_roles(required: Option<&[Role]>, session: &Session) -> AuthorizationVerdict {
    if !session.is_authenticated() {
        return AuthorizationVerdict::RequireLogin;
    }

    let required = required.unwrap_or_default();
    if required.is_empty() {
        return AuthorizationVerdict::Allow;
    }

    if required.iter().all(|role| session.roles().contains(role)) {
        AuthorizationVerdict::Allow
    } else {
        AuthorizationVerdict::Deny
    }
}

/// Required roles the session does not hold, in configured order.
///
/// Diagnostic only; [`evaluate`] is the decision.
pub fn missing_roles(requirement: &RouteRequirement, session: &Session) -> Vec<Role> {
    requirement
        .required_roles()
        .iter()
        .filter(|role| !session.roles().contains(*role))
        .cloned()
        .collect()
}
