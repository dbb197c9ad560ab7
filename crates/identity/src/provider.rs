//! Capability interface of the external identity provider client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sacco_auth::{Profile, Role, Session};

/// Failure reported by the identity provider client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("identity provider unreachable: {0}")]
    Network(String),

    #[error("identity provider protocol error: {0}")]
    Protocol(String),

    #[error("no authenticated session")]
    NotAuthenticated,

    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Options for starting the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOptions {
    /// Where the provider sends the user once login completes.
    pub redirect_uri: String,
}

impl LoginOptions {
    pub fn redirect_to(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Session State Provider: owner of the live session.
///
/// Only implementations of this trait mutate session state; everything else
/// reads it. A successful `login` hands the browsing context to the provider,
/// so callers must treat it as the end of the current navigation.
#[async_trait::async_trait]
pub trait SessionStateProvider: Send + Sync {
    fn is_logged_in(&self) -> bool;

    async fn login(&self, options: LoginOptions) -> ProviderResult<()>;

    async fn logout(&self) -> ProviderResult<()>;

    /// Current access token, if any.
    fn get_token(&self) -> Option<String>;

    /// Refresh the token if it expires within `min_validity_secs`.
    ///
    /// Returns `true` when a refresh actually happened.
    async fn update_token(&self, min_validity_secs: Option<u32>) -> ProviderResult<bool>;

    async fn load_user_profile(&self) -> ProviderResult<Profile>;

    fn get_user_roles(&self) -> Vec<Role>;

    fn is_user_in_role(&self, role: &str) -> bool;

    fn get_username(&self) -> Option<String>;

    fn is_token_expired(&self) -> bool;

    /// Drop client-side session state without contacting the provider.
    fn clear_session(&self) {}

    /// Snapshot of the current session for authorization decisions.
    fn snapshot(&self) -> Session {
        if !self.is_logged_in() {
            return Session::anonymous();
        }

        let mut session = Session::authenticated(self.get_user_roles());
        session.username = self.get_username();
        session
    }
}
