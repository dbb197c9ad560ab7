//! View models for the shell's pages.
//!
//! Views only hold data that has been fully loaded; nothing is rendered from
//! a half-finished provider call.

use sacco_auth::{Profile, Role};
use sacco_identity::{AuthService, LogoutOutcome, ProviderResult, SessionStateProvider};

use crate::routes::DASHBOARD_PATH;

const NOT_AVAILABLE: &str = "N/A";

/// Badge style for a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BadgeKind {
    Admin,
    DebtOfficer,
    ExternalAgent,
    Other,
}

impl BadgeKind {
    pub fn for_role(role: &Role) -> Self {
        if *role == Role::ADMIN {
            Self::Admin
        } else if *role == Role::DEBT_OFFICER {
            Self::DebtOfficer
        } else if *role == Role::EXTERNAL_AGENT {
            Self::ExternalAgent
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub label: &'static str,
    pub granted: bool,
}

/// Shortcut to a role-gated area; disabled without the role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub path: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub profile: Option<Profile>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub actions: Vec<QuickAction>,
}

impl DashboardView {
    /// Load profile, then roles. Profile failures leave `profile` empty.
    pub async fn load<P>(auth: &AuthService<P>) -> Self
    where
        P: SessionStateProvider + ?Sized,
    {
        let profile = auth.get_user_profile().await;
        let roles = auth.get_user_roles();

        let (admin, officer, agent) = (
            auth.is_admin(),
            auth.is_debt_officer(),
            auth.is_external_agent(),
        );

        Self {
            profile,
            roles,
            permissions: vec![
                Permission { label: "Admin Dashboard", granted: admin },
                Permission { label: "Debt Management", granted: officer },
                Permission { label: "External Services", granted: agent },
            ],
            actions: vec![
                QuickAction { label: "Admin Panel", path: "/admin", enabled: admin },
                QuickAction { label: "Debt Management", path: "/debt-management", enabled: officer },
                QuickAction {
                    label: "External Services",
                    path: "/external-services",
                    enabled: agent,
                },
            ],
        }
    }

    fn field(&self, get: impl Fn(&Profile) -> Option<&String>) -> &str {
        self.profile
            .as_ref()
            .and_then(get)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(NOT_AVAILABLE)
    }

    /// First name, else username, else "User".
    pub fn welcome_name(&self) -> &str {
        let profile = self.profile.as_ref();
        profile
            .and_then(|p| p.first_name.as_deref())
            .filter(|s| !s.is_empty())
            .or_else(|| profile.and_then(|p| p.username.as_deref()).filter(|s| !s.is_empty()))
            .unwrap_or("User")
    }

    pub fn username(&self) -> &str {
        self.field(|p| p.username.as_ref())
    }

    pub fn email(&self) -> &str {
        self.field(|p| p.email.as_ref())
    }

    pub fn first_name(&self) -> &str {
        self.field(|p| p.first_name.as_ref())
    }

    pub fn last_name(&self) -> &str {
        self.field(|p| p.last_name.as_ref())
    }

    pub fn badges(&self) -> impl Iterator<Item = (&Role, BadgeKind)> {
        self.roles.iter().map(|r| (r, BadgeKind::for_role(r)))
    }

    pub async fn logout<P>(&self, auth: &AuthService<P>) -> LogoutOutcome
    where
        P: SessionStateProvider + ?Sized,
    {
        auth.logout().await
    }
}

/// Shown after a denied navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnauthorizedView {
    pub username: Option<String>,
    pub roles: Vec<Role>,
}

impl UnauthorizedView {
    pub fn load<P>(auth: &AuthService<P>) -> Self
    where
        P: SessionStateProvider + ?Sized,
    {
        Self {
            username: auth.get_username(),
            roles: auth.get_user_roles(),
        }
    }

    /// Where the "back" action leads.
    pub fn back_path(&self) -> &'static str {
        DASHBOARD_PATH
    }
}

/// Login page state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginView {
    busy: bool,
}

impl LoginView {
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Hand off to the identity provider.
    ///
    /// `busy` is set for the duration of the call and cleared afterwards,
    /// whether or not the provider accepted the request.
    pub async fn sign_in<P>(&mut self, auth: &AuthService<P>, redirect_uri: String) -> ProviderResult<()>
    where
        P: SessionStateProvider + ?Sized,
    {
        self.busy = true;
        let result = auth.login(redirect_uri).await;
        self.busy = false;
        result
    }
}
