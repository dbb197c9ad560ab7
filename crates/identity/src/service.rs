//! Read-through helpers over the Session State Provider.
//!
//! Provider failures stop here: they are logged and turned into safe
//! defaults, so callers never see a raw provider error except from `login`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use sacco_auth::{Profile, Role, Session};

use crate::provider::{LoginOptions, ProviderResult, SessionStateProvider};

/// What to do with client-side session state when the remote logout fails.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutFailurePolicy {
    /// Leave the session exactly as the provider reports it.
    #[default]
    KeepProviderState,
    /// Drop the local session anyway.
    ClearLocalSession,
}

/// Result of [`AuthService::logout`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    Failed { session_cleared: bool },
}

/// Session access for guards and views.
///
/// Holds the single injected provider instance; there is no global lookup.
pub struct AuthService<P: ?Sized> {
    provider: Arc<P>,
    logout_policy: LogoutFailurePolicy,
}

impl<P: ?Sized> Clone for AuthService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            logout_policy: self.logout_policy,
        }
    }
}

impl<P> AuthService<P>
where
    P: SessionStateProvider + ?Sized,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            logout_policy: LogoutFailurePolicy::default(),
        }
    }

    pub fn with_logout_policy(mut self, policy: LogoutFailurePolicy) -> Self {
        self.logout_policy = policy;
        self
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn is_authenticated(&self) -> bool {
        self.provider.is_logged_in()
    }

    /// Current roles; empty when there are none.
    pub fn get_user_roles(&self) -> Vec<Role> {
        self.provider.get_user_roles()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.provider.is_user_in_role(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::ADMIN.as_str())
    }

    pub fn is_debt_officer(&self) -> bool {
        self.has_role(Role::DEBT_OFFICER.as_str())
    }

    pub fn is_external_agent(&self) -> bool {
        self.has_role(Role::EXTERNAL_AGENT.as_str())
    }

    pub fn get_username(&self) -> Option<String> {
        self.provider.get_username()
    }

    /// Access token, or an empty string when there is none.
    pub fn get_token(&self) -> String {
        self.provider.get_token().unwrap_or_default()
    }

    pub fn is_token_expired(&self) -> bool {
        self.provider.is_token_expired()
    }

    /// Snapshot for [`sacco_auth::evaluate`].
    pub fn session(&self) -> Session {
        self.provider.snapshot()
    }

    /// Load the user's profile; `None` when logged out or on any provider failure.
    pub async fn get_user_profile(&self) -> Option<Profile> {
        if !self.is_authenticated() {
            return None;
        }

        match self.provider.load_user_profile().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::error!(error = %e, "failed to load user profile");
                None
            }
        }
    }

    /// Start the provider's login flow.
    ///
    /// On success the provider owns the browsing context; the caller must not
    /// continue the current navigation.
    pub async fn login(&self, redirect_uri: impl Into<String>) -> ProviderResult<()> {
        let options = LoginOptions::redirect_to(redirect_uri);
        tracing::info!(redirect_uri = %options.redirect_uri, "starting login");

        self.provider.login(options).await.inspect_err(|e| {
            tracing::error!(error = %e, "login failed");
        })
    }

    pub async fn logout(&self) -> LogoutOutcome {
        match self.provider.logout().await {
            Ok(()) => {
                tracing::info!("logged out");
                LogoutOutcome::LoggedOut
            }
            Err(e) => {
                let session_cleared = match self.logout_policy {
                    LogoutFailurePolicy::KeepProviderState => false,
                    LogoutFailurePolicy::ClearLocalSession => {
                        self.provider.clear_session();
                        true
                    }
                };
                tracing::error!(error = %e, session_cleared, "logout failed");
                LogoutOutcome::Failed { session_cleared }
            }
        }
    }

    /// Refresh the access token; `false` when nothing was refreshed or on failure.
    pub async fn update_token(&self, min_validity_secs: Option<u32>) -> bool {
        match self.provider.update_token(min_validity_secs).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                false
            }
        }
    }
}
