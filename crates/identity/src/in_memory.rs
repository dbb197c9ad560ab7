//! In-memory identity provider for tests/dev.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use sacco_auth::{Profile, Role, Session};

use crate::provider::{LoginOptions, ProviderError, ProviderResult, SessionStateProvider};

/// Default lifetime of tokens issued by [`InMemoryProvider`].
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 300;

/// Refresh window applied when `update_token` is called without one.
const DEFAULT_MIN_VALIDITY_SECS: u32 = 5;

/// Provider operations that can be scripted to fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
    Login,
    Logout,
    UpdateToken,
    LoadProfile,
}

#[derive(Debug, Clone)]
struct IssuedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    session: Session,
    token: Option<IssuedToken>,
    refreshes: u32,
    login_requests: Vec<LoginOptions>,
    logout_calls: usize,
    failures: HashMap<ProviderOperation, ProviderError>,
}

/// Identity provider that keeps the session in process memory.
///
/// - No IO
/// - `login` only records the request (a real provider would navigate away)
/// - Failures are scripted per operation and persist until `recover`
#[derive(Debug)]
pub struct InMemoryProvider {
    state: Mutex<State>,
    token_ttl: Duration,
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }
}

impl InMemoryProvider {
    /// Provider with no authenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider already holding `session`, with a fresh token when authenticated.
    pub fn with_session(session: Session) -> Self {
        let provider = Self::default();
        provider.sign_in(session);
        provider
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_token(&self, state: &mut State, now: DateTime<Utc>) {
        let subject = state.session.username.as_deref().unwrap_or("anonymous");
        state.token = Some(IssuedToken {
            value: format!("token-{subject}-{}", state.refreshes),
            expires_at: now + self.token_ttl,
        });
    }

    fn scripted_failure(&self, op: ProviderOperation) -> ProviderResult<()> {
        match self.state().failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Simulate the provider completing a login round-trip.
    pub fn sign_in(&self, session: Session) {
        let mut state = self.state();
        let authenticated = session.is_authenticated();
        state.session = session;
        state.refreshes = 0;
        if authenticated {
            self.issue_token(&mut state, Utc::now());
        } else {
            state.token = None;
        }
    }

    /// Replace the current access token verbatim.
    pub fn set_token(&self, value: Option<&str>, expires_at: DateTime<Utc>) {
        self.state().token = value.map(|value| IssuedToken {
            value: value.to_owned(),
            expires_at,
        });
    }

    pub fn fail(&self, op: ProviderOperation, error: ProviderError) {
        self.state().failures.insert(op, error);
    }

    pub fn recover(&self, op: ProviderOperation) {
        self.state().failures.remove(&op);
    }

    /// Login requests received so far, oldest first.
    pub fn login_requests(&self) -> Vec<LoginOptions> {
        self.state().login_requests.clone()
    }

    pub fn logout_calls(&self) -> usize {
        self.state().logout_calls
    }
}

#[async_trait::async_trait]
impl SessionStateProvider for InMemoryProvider {
    fn is_logged_in(&self) -> bool {
        self.state().session.is_authenticated()
    }

    async fn login(&self, options: LoginOptions) -> ProviderResult<()> {
        self.state().login_requests.push(options);
        self.scripted_failure(ProviderOperation::Login)
    }

    async fn logout(&self) -> ProviderResult<()> {
        self.state().logout_calls += 1;
        self.scripted_failure(ProviderOperation::Logout)?;

        let mut state = self.state();
        state.session = Session::anonymous();
        state.token = None;
        Ok(())
    }

    fn get_token(&self) -> Option<String> {
        self.state().token.as_ref().map(|t| t.value.clone())
    }

    async fn update_token(&self, min_validity_secs: Option<u32>) -> ProviderResult<bool> {
        self.scripted_failure(ProviderOperation::UpdateToken)?;

        let mut state = self.state();
        if !state.session.is_authenticated() {
            return Err(ProviderError::NotAuthenticated);
        }

        let now = Utc::now();
        let window = Duration::seconds(i64::from(
            min_validity_secs.unwrap_or(DEFAULT_MIN_VALIDITY_SECS),
        ));
        let needs_refresh = match &state.token {
            Some(token) => token.expires_at - now <= window,
            None => true,
        };

        if needs_refresh {
            state.refreshes += 1;
            self.issue_token(&mut state, now);
        }
        Ok(needs_refresh)
    }

    async fn load_user_profile(&self) -> ProviderResult<Profile> {
        self.scripted_failure(ProviderOperation::LoadProfile)?;

        let state = self.state();
        if !state.session.is_authenticated() {
            return Err(ProviderError::NotAuthenticated);
        }

        Ok(state.session.profile.clone().unwrap_or_else(|| Profile {
            username: state.session.username.clone(),
            ..Profile::default()
        }))
    }

    fn get_user_roles(&self) -> Vec<Role> {
        self.state().session.roles().iter().cloned().collect()
    }

    fn is_user_in_role(&self, role: &str) -> bool {
        self.state().session.has_role(role)
    }

    fn get_username(&self) -> Option<String> {
        let state = self.state();
        if !state.session.is_authenticated() {
            return None;
        }
        state.session.username.clone()
    }

    fn is_token_expired(&self) -> bool {
        match &self.state().token {
            Some(token) => token.expires_at <= Utc::now(),
            None => true,
        }
    }

    fn clear_session(&self) {
        let mut state = self.state();
        state.session = Session::anonymous();
        state.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer() -> Session {
        Session::authenticated(["Debt Officer"]).with_username("officer")
    }

    #[test]
    fn new_provider_is_logged_out() {
        let provider = InMemoryProvider::new();
        assert!(!provider.is_logged_in());
        assert!(provider.get_token().is_none());
        assert!(provider.get_user_roles().is_empty());
        assert!(provider.is_token_expired());
    }

    #[test]
    fn sign_in_issues_token() {
        let provider = InMemoryProvider::with_session(officer());
        assert!(provider.is_logged_in());
        assert_eq!(provider.get_token().as_deref(), Some("token-officer-0"));
        assert!(!provider.is_token_expired());
        assert!(provider.is_user_in_role("Debt Officer"));
        assert_eq!(provider.get_username().as_deref(), Some("officer"));
    }

    #[tokio::test]
    async fn login_only_records_the_request() {
        let provider = InMemoryProvider::new();
        provider
            .login(LoginOptions::redirect_to("http://localhost:4200/admin"))
            .await
            .unwrap();

        assert!(!provider.is_logged_in());
        assert_eq!(
            provider.login_requests(),
            vec![LoginOptions::redirect_to("http://localhost:4200/admin")]
        );
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let provider = InMemoryProvider::with_session(officer());
        provider.logout().await.unwrap();

        assert!(!provider.is_logged_in());
        assert!(provider.get_token().is_none());
        assert_eq!(provider.logout_calls(), 1);
    }

    #[tokio::test]
    async fn failed_logout_keeps_session() {
        let provider = InMemoryProvider::with_session(officer());
        provider.fail(ProviderOperation::Logout, ProviderError::Network("down".into()));

        assert!(provider.logout().await.is_err());
        assert!(provider.is_logged_in());
    }

    #[tokio::test]
    async fn update_token_refreshes_only_near_expiry() {
        let provider = InMemoryProvider::with_session(officer());
        assert!(!provider.update_token(Some(30)).await.unwrap());

        provider.set_token(Some("stale"), Utc::now() + Duration::seconds(10));
        assert!(provider.update_token(Some(30)).await.unwrap());
        assert_eq!(provider.get_token().as_deref(), Some("token-officer-1"));
    }

    #[tokio::test]
    async fn update_token_without_session_fails() {
        let provider = InMemoryProvider::new();
        assert_eq!(
            provider.update_token(None).await,
            Err(ProviderError::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn profile_falls_back_to_username() {
        let provider = InMemoryProvider::with_session(officer());
        let profile = provider.load_user_profile().await.unwrap();
        assert_eq!(profile.username.as_deref(), Some("officer"));

        provider.fail(ProviderOperation::LoadProfile, ProviderError::Protocol("bad json".into()));
        assert!(provider.load_user_profile().await.is_err());

        provider.recover(ProviderOperation::LoadProfile);
        assert!(provider.load_user_profile().await.is_ok());
    }

    #[test]
    fn snapshot_reflects_provider_state() {
        let provider = InMemoryProvider::with_session(officer());
        let snapshot = provider.snapshot();
        assert!(snapshot.is_authenticated());
        assert!(snapshot.has_role("Debt Officer"));
        assert_eq!(snapshot.username.as_deref(), Some("officer"));

        provider.clear_session();
        assert_eq!(provider.snapshot(), Session::anonymous());
    }
}
