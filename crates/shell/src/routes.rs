//! Route table: path → view, guard and role requirement.
//!
//! Route metadata is validated once, when the table is built. Navigation
//! never sees malformed metadata.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use sacco_auth::{MetadataIssue, Role, RouteRequirement};

/// Path matching any otherwise unmatched navigation.
pub const WILDCARD: &str = "**";

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Debug, Error)]
pub enum RouteConfigError {
    #[error("failed to read route file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate route '{0}'")]
    DuplicatePath(String),

    #[error("route '{0}' needs exactly one of 'redirectTo' or 'view'")]
    AmbiguousTarget(String),

    #[error("redirect route '{0}' cannot carry a guard")]
    GuardedRedirect(String),

    #[error("route '{path}': {issue}")]
    Metadata { path: String, issue: MetadataIssue },
}

/// Guard applied before entering a route.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardKind {
    #[default]
    None,
    /// Authentication only.
    Auth,
    /// Authentication plus the roles in the route's metadata.
    Role,
}

/// View rendered when a route is entered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Login,
    Dashboard,
    Unauthorized,
    Loading,
}

/// Route entry as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDefinition {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewKind>,
    #[serde(default)]
    pub guard: GuardKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Validated route target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Redirect(String),
    View {
        view: ViewKind,
        guard: GuardKind,
        requirement: RouteRequirement,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub target: RouteTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

/// Strip query, fragment and surrounding slashes.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_matches('/')
}

impl RouteTable {
    /// The application's routes.
    pub fn builtin() -> Self {
        let redirect = |path: &str, to: &str| Route {
            path: path.to_string(),
            target: RouteTarget::Redirect(to.to_string()),
        };
        let view = |path: &str, view: ViewKind, guard: GuardKind, requirement: RouteRequirement| Route {
            path: path.to_string(),
            target: RouteTarget::View {
                view,
                guard,
                requirement,
            },
        };
        let open = RouteRequirement::none;
        let roles = |role: Role| RouteRequirement::roles([role]);

        Self {
            routes: vec![
                redirect("", DASHBOARD_PATH),
                view("login", ViewKind::Login, GuardKind::None, open()),
                view("dashboard", ViewKind::Dashboard, GuardKind::Auth, open()),
                view("admin", ViewKind::Dashboard, GuardKind::Role, roles(Role::ADMIN)),
                view(
                    "debt-management",
                    ViewKind::Dashboard,
                    GuardKind::Role,
                    roles(Role::DEBT_OFFICER),
                ),
                view(
                    "external-services",
                    ViewKind::Dashboard,
                    GuardKind::Role,
                    roles(Role::EXTERNAL_AGENT),
                ),
                view("unauthorized", ViewKind::Unauthorized, GuardKind::None, open()),
                view("loading", ViewKind::Loading, GuardKind::None, open()),
                redirect(WILDCARD, DASHBOARD_PATH),
            ],
        }
    }

    pub fn load(path: &Path) -> Result<Self, RouteConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RouteConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, RouteConfigError> {
        let definitions: Vec<RouteDefinition> = serde_json::from_str(raw)?;
        Self::from_definitions(definitions)
    }

    /// Validate definitions.
    ///
    /// Role metadata that is not a list is normalised to "no roles required"
    /// with a warning; a list holding non-string entries is rejected.
    pub fn from_definitions(definitions: Vec<RouteDefinition>) -> Result<Self, RouteConfigError> {
        let mut seen = HashSet::new();
        let mut routes = Vec::with_capacity(definitions.len());

        for def in definitions {
            let path = normalize_path(&def.path).to_string();
            if !seen.insert(path.clone()) {
                return Err(RouteConfigError::DuplicatePath(path));
            }

            let target = match (def.redirect_to, def.view) {
                (Some(to), None) => {
                    if def.guard != GuardKind::None {
                        return Err(RouteConfigError::GuardedRedirect(path));
                    }
                    RouteTarget::Redirect(to)
                }
                (None, Some(view)) => RouteTarget::View {
                    view,
                    guard: def.guard,
                    requirement: requirement_for(&path, def.guard, def.data.as_ref())?,
                },
                _ => return Err(RouteConfigError::AmbiguousTarget(path)),
            };

            routes.push(Route { path, target });
        }

        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Route for `path`, falling back to the wildcard route.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find(|r| r.path == path)
            .or_else(|| self.routes.iter().find(|r| r.path == WILDCARD))
    }
}

fn requirement_for(
    path: &str,
    guard: GuardKind,
    data: Option<&Value>,
) -> Result<RouteRequirement, RouteConfigError> {
    match guard {
        GuardKind::Role => match RouteRequirement::parse_metadata(data) {
            Ok(req) => Ok(req),
            Err(issue @ MetadataIssue::NonStringRole { .. }) => Err(RouteConfigError::Metadata {
                path: path.to_string(),
                issue,
            }),
            Err(issue) => {
                tracing::warn!(route = path, %issue, "role metadata normalised to no roles required");
                Ok(RouteRequirement::none())
            }
        },
        GuardKind::None | GuardKind::Auth => {
            if data.is_some() {
                tracing::debug!(route = path, ?guard, "route metadata ignored without a role guard");
            }
            Ok(RouteRequirement::none())
        }
    }
}
