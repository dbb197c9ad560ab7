//! Application wiring and startup navigation.

use std::sync::Arc;

use sacco_identity::{AuthService, ProviderResult, SessionStateProvider};

use crate::config::ShellConfig;
use crate::guard::RouteGuard;
use crate::navigator::{Navigation, Navigator};
use crate::routes::{DASHBOARD_PATH, LOGIN_PATH, RouteConfigError, RouteTable};
use crate::views::{DashboardView, LoginView, UnauthorizedView};

/// The shell: one provider, one session service, one navigator.
pub struct App<P: ?Sized> {
    config: ShellConfig,
    auth: AuthService<P>,
    navigator: Navigator<P>,
}

impl<P> App<P>
where
    P: SessionStateProvider + ?Sized,
{
    /// Wire the shell around `provider`, loading the route table named in the
    /// configuration (or the built-in one).
    pub fn build(config: ShellConfig, provider: Arc<P>) -> Result<Self, RouteConfigError> {
        let routes = match &config.routes_file {
            Some(path) => RouteTable::load(path)?,
            None => RouteTable::builtin(),
        };
        Ok(Self::with_routes(config, provider, routes))
    }

    pub fn with_routes(config: ShellConfig, provider: Arc<P>, routes: RouteTable) -> Self {
        let auth = AuthService::new(provider).with_logout_policy(config.logout_failure_policy);
        let guard = RouteGuard::new(auth.clone(), config.app_origin.clone());

        Self {
            navigator: Navigator::new(routes, guard),
            auth,
            config,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthService<P> {
        &self.auth
    }

    pub fn navigator(&self) -> &Navigator<P> {
        &self.navigator
    }

    /// First navigation once the provider is initialised: the dashboard when
    /// a session exists, the login page otherwise.
    pub async fn start(&mut self) -> Navigation {
        let target = if self.auth.is_authenticated() {
            DASHBOARD_PATH
        } else {
            LOGIN_PATH
        };
        tracing::info!(
            issuer = %self.config.identity.issuer(),
            client_id = %self.config.identity.client_id,
            path = target,
            "shell started"
        );
        self.navigator.navigate(target).await
    }

    pub async fn navigate(&mut self, path: &str) -> Navigation {
        self.navigator.navigate(path).await
    }

    pub async fn dashboard(&self) -> DashboardView {
        DashboardView::load(&self.auth).await
    }

    pub fn unauthorized(&self) -> UnauthorizedView {
        UnauthorizedView::load(&self.auth)
    }

    /// Run the login page's sign-in action; post-login lands on the dashboard.
    ///
    /// On failure the page stays put with its busy flag cleared.
    pub async fn sign_in(&self, view: &mut LoginView) -> ProviderResult<()> {
        let redirect_uri = self.config.redirect_uri(DASHBOARD_PATH);
        view.sign_in(&self.auth, redirect_uri).await
    }
}
