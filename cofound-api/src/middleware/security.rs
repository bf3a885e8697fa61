/// Security headers on every response
///
/// The API only serves JSON, so the content security policy forbids loading
/// anything at all.
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: no-referrer`
/// - `Content-Security-Policy: default-src 'none'; frame-ancestors 'none'`
/// - `Cross-Origin-Resource-Policy: same-site`
/// - `Strict-Transport-Security` (production only)
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use cofound_api::middleware::security::SecurityHeadersLayer;
///
/// let app: Router = Router::new().layer(SecurityHeadersLayer::new(true));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    response::Response,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};

const STATIC_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'",
    ),
    (
        HeaderName::from_static("cross-origin-resource-policy"),
        "same-site",
    ),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Adds the security headers; HSTS only when `enable_hsts`
#[derive(Clone, Copy)]
pub struct SecurityHeadersLayer {
    enable_hsts: bool,
}

impl SecurityHeadersLayer {
    pub fn new(enable_hsts: bool) -> Self {
        Self { enable_hsts }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            enable_hsts: self.enable_hsts,
        }
    }
}

#[derive(Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    enable_hsts: bool,
}

impl<S> Service<Request> for SecurityHeadersMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);
        let enable_hsts = self.enable_hsts;

        Box::pin(async move {
            let mut response = future.await?;
            let headers = response.headers_mut();

            for (name, value) in STATIC_HEADERS {
                headers.insert(name, HeaderValue::from_static(value));
            }

            if enable_hsts {
                headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::Service as _;

    async fn call(enable_hsts: bool) -> Response {
        let mut app = Router::new()
            .route("/test", get(|| async { (StatusCode::OK, "test") }))
            .layer(SecurityHeadersLayer::new(enable_hsts));

        app.call(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let response = call(false).await;
        let headers = response.headers();

        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
        assert_eq!(headers.get("Cross-Origin-Resource-Policy").unwrap(), "same-site");
        assert!(headers
            .get("Content-Security-Policy")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("default-src 'none'"));
    }

    #[tokio::test]
    async fn test_hsts_only_in_production() {
        assert!(call(true).await.headers().get("Strict-Transport-Security").is_some());
        assert!(call(false).await.headers().get("Strict-Transport-Security").is_none());
    }

    #[tokio::test]
    async fn test_headers_on_not_found() {
        let mut app = Router::new().layer(SecurityHeadersLayer::new(false));
        let response = app
            .call(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
    }
}
