//! Navigation dispatcher.
//!
//! Resolves a path against the route table, follows redirects and consults
//! the route's guard before entering it.

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use sacco_identity::SessionStateProvider;

use crate::guard::{GuardDecision, RouteGuard};
use crate::routes::{RouteTable, RouteTarget, ViewKind, normalize_path};

/// Redirect hops followed before giving up on a navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NoRoute(String),

    #[error("too many redirects while navigating to '{0}'")]
    RedirectLoop(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A view is now displayed at `path`.
    Entered { path: String, view: ViewKind },
    /// Login was handed to the identity provider; this navigation will not
    /// complete and the previous view stays in place.
    Abandoned { redirect_uri: String },
    /// Navigation failed; the previous view stays in place.
    Failed(NavigationError),
}

/// One navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub id: Uuid,
    pub requested: String,
    /// Paths redirected through, in order.
    pub redirects: Vec<String>,
    pub outcome: NavigationOutcome,
}

pub struct Navigator<P: ?Sized> {
    routes: RouteTable,
    guard: RouteGuard<P>,
    current: Option<(String, ViewKind)>,
}

impl<P> Navigator<P>
where
    P: SessionStateProvider + ?Sized,
{
    pub fn new(routes: RouteTable, guard: RouteGuard<P>) -> Self {
        Self {
            routes,
            guard,
            current: None,
        }
    }

    /// Currently displayed path and view, if any navigation has succeeded.
    pub fn current(&self) -> Option<(&str, ViewKind)> {
        self.current.as_ref().map(|(path, view)| (path.as_str(), *view))
    }

    pub async fn navigate(&mut self, path: &str) -> Navigation {
        let id = Uuid::now_v7();
        let span = tracing::info_span!("navigation", %id, requested = path);

        async move {
            let mut redirects = Vec::new();
            let outcome = self.dispatch(path, &mut redirects).await;

            match &outcome {
                NavigationOutcome::Entered { path, view } => {
                    tracing::info!(path = %path, ?view, hops = redirects.len(), "entered");
                    self.current = Some((path.clone(), *view));
                }
                NavigationOutcome::Abandoned { redirect_uri } => {
                    tracing::info!(%redirect_uri, "navigation abandoned for login");
                }
                NavigationOutcome::Failed(e) => {
                    tracing::error!(error = %e, "navigation failed");
                }
            }

            Navigation {
                id,
                requested: path.to_string(),
                redirects,
                outcome,
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, requested: &str, redirects: &mut Vec<String>) -> NavigationOutcome {
        // `location` keeps query and fragment for the post-login redirect;
        // `path` is what the route table sees.
        let mut location = format!("/{}", requested.trim_start_matches('/'));
        let mut path = format!("/{}", normalize_path(requested));

        loop {
            let Some(route) = self.routes.resolve(&path) else {
                return NavigationOutcome::Failed(NavigationError::NoRoute(path));
            };

            let next = match &route.target {
                RouteTarget::Redirect(to) => to.clone(),
                RouteTarget::View {
                    view,
                    guard,
                    requirement,
                } => match self.guard.can_activate(&location, *guard, requirement).await {
                    GuardDecision::Proceed => {
                        return NavigationOutcome::Entered { path, view: *view };
                    }
                    GuardDecision::LoginStarted { redirect_uri } => {
                        return NavigationOutcome::Abandoned { redirect_uri };
                    }
                    GuardDecision::Redirect(to) => to,
                },
            };

            if redirects.len() >= MAX_REDIRECTS {
                return NavigationOutcome::Failed(NavigationError::RedirectLoop(
                    requested.to_string(),
                ));
            }
            tracing::debug!(from = %path, to = %next, "redirect");
            path = format!("/{}", normalize_path(&next));
            location = format!("/{}", next.trim_start_matches('/'));
            redirects.push(path.clone());
        }
    }
}
