//! Route guards: turn an authorization verdict into a navigation decision.

use sacco_auth::{AuthorizationVerdict, RouteRequirement, evaluate, missing_roles};
use sacco_identity::{AuthService, SessionStateProvider};

use crate::config::join_origin;
use crate::routes::{GuardKind, LOGIN_PATH, UNAUTHORIZED_PATH};

/// What the dispatcher must do after a guard ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Enter the route.
    Proceed,
    /// Navigate elsewhere instead.
    Redirect(String),
    /// The provider's login flow was started; the navigation is over.
    LoginStarted { redirect_uri: String },
}

/// Guard shared by all routes.
///
/// `GuardKind::Auth` checks authentication only, `GuardKind::Role` also
/// checks the route's required roles.
pub struct RouteGuard<P: ?Sized> {
    auth: AuthService<P>,
    app_origin: String,
}

impl<P> RouteGuard<P>
where
    P: SessionStateProvider + ?Sized,
{
    pub fn new(auth: AuthService<P>, app_origin: impl Into<String>) -> Self {
        Self {
            auth,
            app_origin: app_origin.into(),
        }
    }

    /// Decide whether `location` may be entered.
    ///
    /// `location` is the in-app location as requested, query and fragment
    /// included; it becomes the post-login redirect target unchanged.
    /// The session is read once per call. On `RequireLogin` the login flow is
    /// started exactly once and no further decision is made.
    pub async fn can_activate(
        &self,
        location: &str,
        guard: GuardKind,
        requirement: &RouteRequirement,
    ) -> GuardDecision {
        let session = self.auth.session();
        let verdict = match guard {
            GuardKind::None => return GuardDecision::Proceed,
            GuardKind::Auth => evaluate(&RouteRequirement::none(), &session),
            GuardKind::Role => evaluate(requirement, &session),
        };

        match verdict {
            AuthorizationVerdict::Allow => GuardDecision::Proceed,
            AuthorizationVerdict::Deny => {
                let missing = missing_roles(requirement, &session);
                tracing::warn!(
                    route = location,
                    username = session.username.as_deref().unwrap_or("-"),
                    ?missing,
                    "access denied"
                );
                GuardDecision::Redirect(UNAUTHORIZED_PATH.to_string())
            }
            AuthorizationVerdict::RequireLogin => {
                let redirect_uri = join_origin(&self.app_origin, location);
                match self.auth.login(redirect_uri.clone()).await {
                    Ok(()) => GuardDecision::LoginStarted { redirect_uri },
                    // The provider could not take over; show the login page instead.
                    Err(_) => GuardDecision::Redirect(LOGIN_PATH.to_string()),
                }
            }
        }
    }
}
