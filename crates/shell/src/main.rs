use std::sync::Arc;

use anyhow::Context;

use sacco_auth::Session;
use sacco_identity::InMemoryProvider;
use sacco_shell::{App, NavigationOutcome, ShellConfig};

/// Demo session seeded from `SACCO_DEMO_USER` / `SACCO_DEMO_ROLES`.
fn demo_session() -> Session {
    let Ok(user) = std::env::var("SACCO_DEMO_USER") else {
        tracing::warn!("SACCO_DEMO_USER not set; starting without a session");
        return Session::anonymous();
    };

    let roles: Vec<String> = std::env::var("SACCO_DEMO_ROLES")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();

    Session::authenticated(roles).with_username(user)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sacco_observability::init();

    let config = ShellConfig::from_env().context("invalid shell configuration")?;
    let provider = Arc::new(InMemoryProvider::with_session(demo_session()));
    let mut app = App::build(config, provider).context("failed to load route table")?;

    app.start().await;

    for path in std::env::args().skip(1) {
        let navigation = app.navigate(&path).await;
        if let NavigationOutcome::Abandoned { .. } = navigation.outcome {
            // The provider owns the browsing context from here on.
            break;
        }
    }

    if let Some((path, view)) = app.navigator().current() {
        tracing::info!(path, ?view, "final view");
    }
    Ok(())
}
