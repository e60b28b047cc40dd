//! Security and caching headers for every response.
//!
//! The storefront serves no scripts and no third-party assets, so the policy
//! allows only same-origin styles, images and form posts. Pages are never
//! cached; static assets and product images are.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content Security Policy for server-rendered pages.
///
/// Forms post back to the storefront itself (`form-action 'self'`) and
/// images come from `/static` or `/media`.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'none'; \
     script-src 'none'; \
     style-src 'self'; \
     img-src 'self'; \
     connect-src 'none'; \
     frame-src 'none'; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

const PERMISSIONS_POLICY: &str = "camera=(), \
     display-capture=(), \
     fullscreen=(), \
     geolocation=(), \
     microphone=(), \
     payment=(), \
     publickey-credentials-get=(), \
     usb=(), \
     interest-cohort=()";

/// Content-hashed CSS written by `build.rs`; the name changes with the content.
const HASHED_ASSET_PREFIX: &str = "/static/css/derived/";

/// `Cache-Control` for a request path.
#[must_use]
pub fn cache_policy(path: &str) -> &'static str {
    if path.starts_with(HASHED_ASSET_PREFIX) {
        "public, max-age=31536000, immutable"
    } else if path.starts_with("/static/") || path.starts_with("/media/") {
        "public, max-age=3600"
    } else {
        // Pages show the cart, flash messages and staff controls
        "no-store, max-age=0"
    }
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: same-origin`
/// - `Content-Security-Policy` ([`CONTENT_SECURITY_POLICY_VALUE`])
/// - `Permissions-Policy` denying device and payment APIs
/// - `Cache-Control` per [`cache_policy`]
/// - `Cross-Origin-Opener-Policy` / `Cross-Origin-Resource-Policy: same-origin`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let cache_control = cache_policy(request.uri().path());

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    // Same-origin keeps the referer on our own form posts only
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache_control));
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware::from_fn, routing::get};
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn test_cache_policy() {
        assert_eq!(
            cache_policy("/static/css/derived/main.1a2b3c4d.css"),
            "public, max-age=31536000, immutable"
        );
        assert_eq!(cache_policy("/static/img/placeholder.svg"), "public, max-age=3600");
        assert_eq!(cache_policy("/media/products/x.png"), "public, max-age=3600");
        assert_eq!(cache_policy("/cart/"), "no-store, max-age=0");
        assert_eq!(cache_policy("/staticky/"), "no-store, max-age=0");
    }

    #[tokio::test]
    async fn test_headers_applied() {
        let app = Router::new()
            .route("/cart/", get(|| async { "cart" }))
            .layer(from_fn(security_headers_middleware));

        let resp = app
            .oneshot(Request::get("/cart/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = resp.headers();
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[CACHE_CONTROL], "no-store, max-age=0");
        assert!(
            headers[CONTENT_SECURITY_POLICY]
                .to_str()
                .unwrap()
                .contains("form-action 'self'")
        );
    }
}
