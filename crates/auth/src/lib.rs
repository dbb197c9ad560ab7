//! `sacco-auth` — pure route authorization (no IO, no provider access).
//!
//! Callers take a [`Session`] snapshot from the identity provider and ask
//! [`evaluate`] whether a navigation may proceed.

pub mod authorize;
pub mod roles;
pub mod route;
pub mod session;

pub use authorize::{AuthorizationVerdict, evaluate, evaluate_roles, missing_roles};
pub use roles::Role;
pub use route::{MetadataIssue, RouteRequirement};
pub use session::{Profile, Session};
