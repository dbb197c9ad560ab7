//! `sacco-shell` — navigation shell for the Sacco debt management app.
//!
//! Routes are gated by role claims from the identity provider session; see
//! [`navigator::Navigator`] for the dispatch loop.

pub mod app;
pub mod config;
pub mod guard;
pub mod navigator;
pub mod routes;
pub mod views;

pub use app::App;
pub use config::{ConfigError, IdentityProviderConfig, ShellConfig};
pub use guard::{GuardDecision, RouteGuard};
pub use navigator::{Navigation, NavigationError, NavigationOutcome, Navigator};
pub use routes::{GuardKind, Route, RouteConfigError, RouteDefinition, RouteTable, RouteTarget, ViewKind};
pub use views::{DashboardView, LoginView, UnauthorizedView};
