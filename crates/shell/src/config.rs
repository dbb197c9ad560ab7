//! Shell configuration, read from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sacco_identity::LogoutFailurePolicy;

pub const IDP_URL_ENV: &str = "SACCO_IDP_URL";
pub const IDP_REALM_ENV: &str = "SACCO_IDP_REALM";
pub const IDP_CLIENT_ID_ENV: &str = "SACCO_IDP_CLIENT_ID";
pub const APP_ORIGIN_ENV: &str = "SACCO_APP_ORIGIN";
pub const LOGOUT_POLICY_ENV: &str = "SACCO_LOGOUT_FAILURE_POLICY";
pub const ROUTES_FILE_ENV: &str = "SACCO_ROUTES_FILE";

const DEFAULT_IDP_URL: &str = "http://localhost:8080";
const DEFAULT_IDP_REALM: &str = "SaccoRealm";
const DEFAULT_IDP_CLIENT_ID: &str = "sacco-app";
const DEFAULT_APP_ORIGIN: &str = "http://localhost:4200";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("{var} must be an absolute http(s) URL, got '{value}'")]
    NotAnUrl { var: &'static str, value: String },

    #[error("unknown logout failure policy '{0}' (expected 'keep' or 'clear')")]
    UnknownLogoutPolicy(String),
}

/// Where the identity provider lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
}

impl IdentityProviderConfig {
    /// Issuer URL of the realm.
    pub fn issuer(&self) -> String {
        format!("{}/realms/{}", self.url, self.realm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellConfig {
    pub identity: IdentityProviderConfig,
    /// Public origin of the application, used to build post-login redirects.
    pub app_origin: String,
    #[serde(default)]
    pub logout_failure_policy: LogoutFailurePolicy,
    /// Route table override; the built-in table is used when absent.
    #[serde(default)]
    pub routes_file: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            identity: IdentityProviderConfig {
                url: DEFAULT_IDP_URL.to_string(),
                realm: DEFAULT_IDP_REALM.to_string(),
                client_id: DEFAULT_IDP_CLIENT_ID.to_string(),
            },
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            logout_failure_policy: LogoutFailurePolicy::default(),
            routes_file: None,
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str, default: &str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var: name }),
                Some(value) => Ok(value.trim().to_string()),
                None => {
                    tracing::warn!(var = name, default, "not set; using dev default");
                    Ok(default.to_string())
                }
            }
        };

        let identity = IdentityProviderConfig {
            url: absolute_url(IDP_URL_ENV, var(IDP_URL_ENV, DEFAULT_IDP_URL)?)?,
            realm: var(IDP_REALM_ENV, DEFAULT_IDP_REALM)?,
            client_id: var(IDP_CLIENT_ID_ENV, DEFAULT_IDP_CLIENT_ID)?,
        };
        let app_origin = absolute_url(APP_ORIGIN_ENV, var(APP_ORIGIN_ENV, DEFAULT_APP_ORIGIN)?)?;

        let logout_failure_policy = match lookup(LOGOUT_POLICY_ENV).as_deref().map(str::trim) {
            None | Some("") | Some("keep") => LogoutFailurePolicy::KeepProviderState,
            Some("clear") => LogoutFailurePolicy::ClearLocalSession,
            Some(other) => return Err(ConfigError::UnknownLogoutPolicy(other.to_string())),
        };

        let routes_file = lookup(ROUTES_FILE_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            identity,
            app_origin,
            logout_failure_policy,
            routes_file,
        })
    }

    /// Absolute URL for an in-app path, used as the login redirect target.
    pub fn redirect_uri(&self, path: &str) -> String {
        join_origin(&self.app_origin, path)
    }
}

/// `origin` + `path`, with exactly one slash between them.
pub fn join_origin(origin: &str, path: &str) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn absolute_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::NotAnUrl { var, value });
    }
    Ok(value.trim_end_matches('/').to_string())
}
