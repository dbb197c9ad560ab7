//! `sacco-identity` — boundary to the external identity provider.
//!
//! The provider itself (login, logout, token issuance) lives elsewhere; this
//! crate defines the capability it must offer, the session helpers built on
//! it, and the outbound bearer-token rule.

pub mod bearer;
pub mod in_memory;
pub mod provider;
pub mod service;

pub use bearer::{BearerAuth, BearerAuthLayer, attach_bearer, bearer_token};
pub use in_memory::{InMemoryProvider, ProviderOperation};
pub use provider::{LoginOptions, ProviderError, ProviderResult, SessionStateProvider};
pub use service::{AuthService, LogoutFailurePolicy, LogoutOutcome};
