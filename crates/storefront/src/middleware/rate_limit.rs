//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the login form is limited; everything else is cheap or already
//! behind a session.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor for the client address.
///
/// Keys on the peer address from `ConnectInfo`. `X-Forwarded-For` and
/// `X-Real-IP` are read only when `trust_proxy_headers` is set, since a
/// directly connected client can put anything in them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    fn forwarded_ip<T>(req: &Request<T>) -> Option<IpAddr> {
        let headers = req.headers();

        // First IP in the X-Forwarded-For chain
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = self
            .trust_proxy_headers
            .then(|| Self::forwarded_ip(req))
            .flatten();
        if let Some(ip) = forwarded {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the login form: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// This slows password guessing against `/`. Set `trust_proxy_headers` only
/// when the storefront sits behind a proxy that overwrites `X-Forwarded-For`.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn from_peer(forwarded_for: &str) -> Request<()> {
        let mut req = Request::builder()
            .header("x-forwarded-for", forwarded_for)
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 9], 40000))));
        req
    }

    #[test]
    fn test_spoofed_forwarded_for_is_ignored() {
        let direct = ClientIpKeyExtractor::default();
        let first = direct.extract(&from_peer("1.1.1.1")).unwrap();
        let second = direct.extract(&from_peer("2.2.2.2")).unwrap();
        assert_eq!(first.to_string(), "198.51.100.9");
        assert_eq!(first, second);
    }

    #[test]
    fn test_trusted_proxy_uses_forwarded_for() {
        let proxied = ClientIpKeyExtractor {
            trust_proxy_headers: true,
        };
        let ip = proxied.extract(&from_peer("203.0.113.7, 10.0.0.1")).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_trusted_proxy_without_header_uses_peer() {
        let proxied = ClientIpKeyExtractor {
            trust_proxy_headers: true,
        };
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 5000))));
        let ip = proxied.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "192.0.2.4");
    }

    #[test]
    fn test_no_source_fails() {
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor::default().extract(&req).is_err());
    }
}
