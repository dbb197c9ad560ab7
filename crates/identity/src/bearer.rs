//! Outbound request augmentation: `Authorization: Bearer <token>`.

use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::{AUTHORIZATION, HeaderValue};
use http::Request;
use tower::{Layer, Service};

use crate::provider::SessionStateProvider;

/// Token to attach for the provider's current session, if any.
///
/// Absent when logged out or when the provider has no non-empty token.
pub fn bearer_token<P>(provider: &P) -> Option<String>
where
    P: SessionStateProvider + ?Sized,
{
    if !provider.is_logged_in() {
        return None;
    }
    provider.get_token().filter(|token| !token.is_empty())
}

/// Return `request` with a bearer `Authorization` header for `token`.
///
/// Without a token the request comes back untouched. An existing
/// `Authorization` header is replaced, so re-applying the same token always
/// leaves exactly one header.
pub fn attach_bearer<B>(mut request: Request<B>, token: Option<&str>) -> Request<B> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return request;
    };

    match HeaderValue::try_from(format!("Bearer {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Err(_) => {
            tracing::warn!("access token is not a valid header value; sending request without it");
        }
    }
    request
}

/// Layer adding the session's bearer token to every outbound request.
pub struct BearerAuthLayer<P: ?Sized> {
    provider: Arc<P>,
}

impl<P: ?Sized> BearerAuthLayer<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

impl<P: ?Sized> Clone for BearerAuthLayer<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<S, P: ?Sized> Layer<S> for BearerAuthLayer<P> {
    type Service = BearerAuth<S, P>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuth {
            inner,
            provider: Arc::clone(&self.provider),
        }
    }
}

/// Service produced by [`BearerAuthLayer`].
pub struct BearerAuth<S, P: ?Sized> {
    inner: S,
    provider: Arc<P>,
}

impl<S: Clone, P: ?Sized> Clone for BearerAuth<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<S, P, B> Service<Request<B>> for BearerAuth<S, P>
where
    S: Service<Request<B>>,
    P: SessionStateProvider + ?Sized,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let token = bearer_token(&*self.provider);
        self.inner.call(attach_bearer(request, token.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use chrono::{Duration, Utc};
    use tower::{ServiceBuilder, ServiceExt, service_fn};

    use sacco_auth::Session;

    use super::*;
    use crate::in_memory::InMemoryProvider;

    fn request() -> Request<()> {
        Request::builder()
            .uri("http://localhost:8081/api/loans")
            .header("x-request-id", "42")
            .body(())
            .unwrap()
    }

    fn authorization(req: &Request<()>) -> Vec<&HeaderValue> {
        req.headers().get_all(AUTHORIZATION).iter().collect()
    }

    #[test]
    fn attaches_header() {
        let req = attach_bearer(request(), Some("abc"));
        assert_eq!(authorization(&req), vec!["Bearer abc"]);
        assert_eq!(req.headers()["x-request-id"], "42");
        assert_eq!(req.uri(), "http://localhost:8081/api/loans");
    }

    #[test]
    fn reapplying_same_token_keeps_one_header() {
        let req = attach_bearer(attach_bearer(request(), Some("abc")), Some("abc"));
        assert_eq!(authorization(&req), vec!["Bearer abc"]);
    }

    #[test]
    fn last_token_wins() {
        let req = attach_bearer(attach_bearer(request(), Some("old")), Some("new"));
        assert_eq!(authorization(&req), vec!["Bearer new"]);
    }

    #[test]
    fn no_token_is_a_no_op() {
        for token in [None, Some("")] {
            let req = attach_bearer(request(), token);
            let untouched = request();
            assert_eq!(req.headers(), untouched.headers());
            assert_eq!(req.uri(), untouched.uri());
            assert_eq!(req.method(), untouched.method());
        }
    }

    #[test]
    fn invalid_token_is_not_sent() {
        let req = attach_bearer(request(), Some("bad\ntoken"));
        assert!(authorization(&req).is_empty());
    }

    #[test]
    fn no_token_when_logged_out() {
        let provider = InMemoryProvider::new();
        provider.set_token(Some("leftover"), Utc::now() + Duration::minutes(5));
        assert_eq!(bearer_token(&provider), None);
    }

    #[tokio::test]
    async fn layer_adds_session_token() {
        let provider = Arc::new(InMemoryProvider::with_session(
            Session::authenticated(["Admin"]).with_username("ann"),
        ));

        let svc = ServiceBuilder::new()
            .layer(BearerAuthLayer::new(provider))
            .service(service_fn(|req: Request<()>| async move {
                Ok::<_, Infallible>(req.headers().get(AUTHORIZATION).cloned())
            }));

        let header = svc.oneshot(request()).await.unwrap();
        assert_eq!(header.unwrap(), "Bearer token-ann-0");
    }

    #[tokio::test]
    async fn layer_passes_through_when_logged_out() {
        let provider = Arc::new(InMemoryProvider::new());

        let svc = BearerAuthLayer::new(provider).layer(service_fn(|req: Request<()>| async move {
            Ok::<_, Infallible>(req.headers().contains_key(AUTHORIZATION))
        }));

        assert!(!svc.oneshot(request()).await.unwrap());
    }
}
