use std::sync::Arc;

use sacco_auth::{AuthorizationVerdict, Profile, Role, RouteRequirement, Session, evaluate};
use sacco_identity::{
    AuthService, InMemoryProvider, LoginOptions, LogoutFailurePolicy, LogoutOutcome, ProviderError,
    ProviderOperation,
};
use sacco_shell::{App, NavigationOutcome, ShellConfig, ViewKind};

fn app(session: Session) -> (Arc<InMemoryProvider>, App<InMemoryProvider>) {
    let provider = Arc::new(InMemoryProvider::with_session(session));
    let app = App::build(ShellConfig::default(), provider.clone()).expect("built-in routes");
    (provider, app)
}

#[test]
fn scenario_a_no_roles_required() {
    let session = Session::authenticated(Vec::<Role>::new());
    assert_eq!(evaluate(&RouteRequirement::none(), &session), AuthorizationVerdict::Allow);
}

#[tokio::test]
async fn scenario_b_admin_enters_admin_area() {
    let session = Session::authenticated(["Admin", "Debt Officer"]);
    assert_eq!(
        evaluate(&RouteRequirement::roles(["Admin"]), &session),
        AuthorizationVerdict::Allow
    );

    let (_, mut app) = app(session);
    let navigation = app.navigate("/admin").await;
    assert_eq!(
        navigation.outcome,
        NavigationOutcome::Entered {
            path: "/admin".to_string(),
            view: ViewKind::Dashboard
        }
    );
    assert!(navigation.redirects.is_empty());
}

#[tokio::test]
async fn scenario_c_officer_is_denied_admin_area() {
    let session = Session::authenticated(["Debt Officer"]);
    assert_eq!(
        evaluate(&RouteRequirement::roles(["Admin"]), &session),
        AuthorizationVerdict::Deny
    );

    let (_, mut app) = app(session);
    let navigation = app.navigate("/admin").await;
    assert_eq!(navigation.redirects, vec!["/unauthorized".to_string()]);
    assert_eq!(
        navigation.outcome,
        NavigationOutcome::Entered {
            path: "/unauthorized".to_string(),
            view: ViewKind::Unauthorized
        }
    );
    assert_eq!(app.unauthorized().roles, vec![Role::DEBT_OFFICER]);
}

#[tokio::test]
async fn scenario_d_anonymous_user_is_sent_to_login_once() {
    assert_eq!(
        evaluate(&RouteRequirement::roles(["Admin"]), &Session::anonymous()),
        AuthorizationVerdict::RequireLogin
    );

    let (provider, mut app) = app(Session::anonymous());
    let navigation = app.navigate("/admin").await;

    assert_eq!(
        navigation.outcome,
        NavigationOutcome::Abandoned {
            redirect_uri: "http://localhost:4200/admin".to_string()
        }
    );
    assert_eq!(
        provider.login_requests(),
        vec![LoginOptions::redirect_to("http://localhost:4200/admin")]
    );
}

#[tokio::test]
async fn scenario_e_profile_failure_resolves_to_none() {
    let provider = Arc::new(InMemoryProvider::with_session(
        Session::authenticated(["Admin"]).with_profile(Profile::default()),
    ));
    provider.fail(ProviderOperation::LoadProfile, ProviderError::Protocol("bad payload".into()));

    let auth = AuthService::new(provider);
    assert_eq!(auth.get_user_profile().await, None);
}

#[tokio::test]
async fn startup_goes_to_dashboard_or_login() {
    let (_, mut signed_in) = app(Session::authenticated(["External Agent"]));
    assert_eq!(
        signed_in.start().await.outcome,
        NavigationOutcome::Entered {
            path: "/dashboard".to_string(),
            view: ViewKind::Dashboard
        }
    );

    let (provider, mut anonymous) = app(Session::anonymous());
    assert_eq!(
        anonymous.start().await.outcome,
        NavigationOutcome::Entered {
            path: "/login".to_string(),
            view: ViewKind::Login
        }
    );
    assert!(provider.login_requests().is_empty());
}

#[tokio::test]
async fn logout_failure_policy_comes_from_config() {
    let provider = Arc::new(InMemoryProvider::with_session(Session::authenticated(["Admin"])));
    provider.fail(ProviderOperation::Logout, ProviderError::Network("down".into()));

    let config = ShellConfig {
        logout_failure_policy: LogoutFailurePolicy::ClearLocalSession,
        ..ShellConfig::default()
    };
    let app = App::build(config, provider.clone()).expect("built-in routes");

    let dashboard = app.dashboard().await;
    assert_eq!(
        dashboard.logout(app.auth()).await,
        LogoutOutcome::Failed { session_cleared: true }
    );
    assert!(!app.auth().is_authenticated());
}
