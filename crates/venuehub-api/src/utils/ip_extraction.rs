//! Client address used as the rate limit key and recorded on audit rows.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// Requests whose address cannot be determined share this bucket.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client IP resolved once per request by the rate limit middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CLIENT
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ClientIp>()
            .cloned()
            .unwrap_or_else(|| ClientIp(UNKNOWN_CLIENT.to_string())))
    }
}

/// Resolve the client address.
///
/// `X-Forwarded-For` is read right to left: the last `trusted_proxy_count`
/// hops belong to our own proxies and the entry before them is the client.
/// A chain no longer than the proxy count yields its left-most entry. Then
/// `X-Real-IP`, then the socket peer. Malformed values are ignored.
pub fn extract_client_ip(
    headers: &HeaderMap,
    peer: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    forwarded_client(headers, trusted_proxy_count)
        .or_else(|| header_ip(headers, "x-real-ip"))
        .or_else(|| peer.map(SocketAddr::ip))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_client(headers: &HeaderMap, trusted_proxy_count: usize) -> Option<IpAddr> {
    let chain: Vec<&str> = headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .collect();
    let position = chain.len().checked_sub(1)?.saturating_sub(trusted_proxy_count);
    chain.get(position)?.parse().ok()
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn one_trusted_proxy_skips_the_load_balancer_hop() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.2")]);
        assert_eq!(extract_client_ip(&h, None, 1), "203.0.113.7");
    }

    #[test]
    fn spoofed_prefix_is_ignored_behind_two_proxies() {
        let h = headers(&[("x-forwarded-for", "1.1.1.1, 203.0.113.7, 10.0.0.2, 10.0.0.3")]);
        assert_eq!(extract_client_ip(&h, None, 2), "203.0.113.7");
    }

    #[test]
    fn without_trusted_proxies_the_nearest_hop_is_the_client() {
        let h = headers(&[("x-forwarded-for", "1.1.1.1, 198.51.100.4")]);
        assert_eq!(extract_client_ip(&h, None, 0), "198.51.100.4");
    }

    #[test]
    fn short_chain_uses_first_entry() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7")]);
        assert_eq!(extract_client_ip(&h, None, 3), "203.0.113.7");
    }

    #[test]
    fn garbage_forwarded_for_falls_back_to_real_ip_then_peer() {
        let h = headers(&[("x-forwarded-for", "not-an-ip"), ("x-real-ip", " ::1 ")]);
        assert_eq!(extract_client_ip(&h, None, 1), "::1");

        let peer = SocketAddr::from(([192, 0, 2, 10], 443));
        let h = headers(&[("x-forwarded-for", "999.1.1.1")]);
        assert_eq!(extract_client_ip(&h, Some(&peer), 1), "192.0.2.10");
    }

    #[test]
    fn unresolvable_requests_share_the_unknown_bucket() {
        let a = extract_client_ip(&HeaderMap::new(), None, 1);
        let b = extract_client_ip(&headers(&[("x-real-ip", "localhost")]), None, 1);
        assert_eq!(a, UNKNOWN_CLIENT);
        assert_eq!(a, b);
        assert!(ClientIp(a).is_unknown());
    }

    #[tokio::test]
    async fn extractor_defaults_to_unknown() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let ip = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(ip.is_unknown());
    }
}
