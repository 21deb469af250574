//! Security headers middleware.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Environment flag enabling `Strict-Transport-Security`.
const HSTS_ENV: &str = "INV__SECURITY__HSTS_ENABLED";

/// Adds security headers to every response.
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: no-referrer`
/// - `Cache-Control: no-store` unless the handler set its own
/// - `Strict-Transport-Security` only when `INV__SECURITY__HSTS_ENABLED=true`,
///   since it must only be sent behind TLS termination
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );

    // Inventory data and tokens must not linger in shared caches
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    if hsts_enabled(std::env::var(HSTS_ENV).ok().as_deref()) {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

fn hsts_enabled(value: Option<&str>) -> bool {
    value.map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_hsts_enabled_parsing() {
        assert!(hsts_enabled(Some("true")));
        assert!(hsts_enabled(Some("TRUE")));
        assert!(!hsts_enabled(Some("1")));
        assert!(!hsts_enabled(Some("yes")));
        assert!(!hsts_enabled(Some("")));
        assert!(!hsts_enabled(None));
    }

    #[tokio::test]
    async fn test_headers_added() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(security_headers_middleware));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    }

    #[tokio::test]
    async fn test_existing_cache_control_kept() {
        let app = Router::new()
            .route(
                "/",
                get(|| async { ([(header::CACHE_CONTROL, "max-age=60")], "ok") }),
            )
            .layer(middleware::from_fn(security_headers_middleware));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=60"
        );
    }
}
