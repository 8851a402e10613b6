//! CSRF protection for cookie-authenticated requests
//!
//! Double-submit cookie pattern: a signed token is issued both in the JSON
//! body and in the `csrf-token` cookie, and state-changing requests must echo
//! it in the `X-CSRF-Token` header. Requests carrying a bearer token are not
//! exposed to cross-site forgery and skip the check.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap, Method};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const CSRF_COOKIE: &str = "csrf-token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const SESSION_COOKIE: &str = "session-token";

/// CSRF token expiration time (1 hour)
pub const CSRF_TOKEN_EXPIRATION_SECS: u64 = 3600;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CsrfTokenResponse {
    pub token: String,
}

/// Signing secret plus cookie policy
#[derive(Clone)]
pub struct CsrfConfig {
    secret: String,
    secure_cookie: bool,
}

impl CsrfConfig {
    pub fn new(secret: impl Into<String>, secure_cookie: bool) -> Self {
        Self {
            secret: secret.into(),
            secure_cookie,
        }
    }

    pub fn generate_token(&self) -> String {
        sign_token(&self.secret, unix_now(), &Uuid::new_v4().to_string())
    }

    pub fn verify_token(&self, token: &str) -> bool {
        verify_csrf_token(token, &self.secret, unix_now())
    }

    /// `Set-Cookie` value carrying `token`
    pub fn cookie(&self, token: &str) -> String {
        let secure_flag = if self.secure_cookie { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Strict{}",
            CSRF_COOKIE, token, CSRF_TOKEN_EXPIRATION_SECS, secure_flag
        )
    }

    /// Run the double-submit check for a request.
    pub fn check(&self, method: &Method, headers: &HeaderMap) -> CsrfOutcome {
        if !requires_csrf(method, headers) {
            return CsrfOutcome::Exempt;
        }

        let header_token = headers
            .get(CSRF_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim);
        let cookie_token = read_cookie(headers, CSRF_COOKIE);

        match (header_token, cookie_token) {
            (Some(header), Some(cookie)) => {
                let matches: bool = header.as_bytes().ct_eq(cookie.as_bytes()).into();
                if matches && self.verify_token(header) {
                    CsrfOutcome::Valid
                } else {
                    CsrfOutcome::Invalid
                }
            }
            _ => CsrfOutcome::Missing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfOutcome {
    Exempt,
    Valid,
    Missing,
    Invalid,
}

impl CsrfOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, CsrfOutcome::Exempt | CsrfOutcome::Valid)
    }
}

/// Only unsafe methods riding on the session cookie need a token.
pub fn requires_csrf(method: &Method, headers: &HeaderMap) -> bool {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return false;
    }
    let has_bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|value| value.starts_with("Bearer "))
        .unwrap_or(false);
    if has_bearer {
        return false;
    }
    read_cookie(headers, SESSION_COOKIE).is_some()
}

/// Value of cookie `name` from the `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn mac_hex(secret: &str, message: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(message.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Token format: `<hmac>.<timestamp>.<nonce>`
fn sign_token(secret: &str, timestamp: u64, nonce: &str) -> String {
    let message = format!("{}.{}", timestamp, nonce);
    let hmac = mac_hex(secret, &message).unwrap_or_default();
    format!("{}.{}", hmac, message)
}

fn verify_csrf_token(token: &str, secret: &str, now: u64) -> bool {
    let mut parts = token.splitn(3, '.');
    let (Some(hmac_part), Some(timestamp_str), Some(nonce)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(timestamp) = timestamp_str.parse::<u64>() else {
        return false;
    };
    if timestamp + CSRF_TOKEN_EXPIRATION_SECS < now {
        tracing::debug!("CSRF token expired");
        return false;
    }

    let Some(expected) = mac_hex(secret, &format!("{}.{}", timestamp, nonce)) else {
        return false;
    };
    expected.as_bytes().ct_eq(hmac_part.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config() -> CsrfConfig {
        CsrfConfig::new("test-secret", false)
    }

    fn cookie_request(cookie: &str, header_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        if let Some(token) = header_token {
            headers.insert(CSRF_HEADER, HeaderValue::from_str(token).unwrap());
        }
        headers
    }

    #[test]
    fn generated_token_shape() {
        let token = config().generate_token();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 64);
        assert!(parts[1].parse::<u64>().is_ok());
    }

    #[test]
    fn token_verifies_only_with_same_secret() {
        let token = config().generate_token();
        assert!(config().verify_token(&token));
        assert!(!CsrfConfig::new("other", false).verify_token(&token));
        assert!(!config().verify_token("abc.123"));
        assert!(!config().verify_token("invalid"));
    }

    #[test]
    fn expired_token_rejected() {
        let issued = 1_700_000_000;
        let token = sign_token("test-secret", issued, "nonce");
        assert!(verify_csrf_token(&token, "test-secret", issued + 10));
        assert!(!verify_csrf_token(
            &token,
            "test-secret",
            issued + CSRF_TOKEN_EXPIRATION_SECS + 1
        ));
    }

    #[test]
    fn cookie_session_post_needs_matching_header() {
        let config = config();
        let token = config.generate_token();
        let cookie = format!("session-token=abc; csrf-token={}", token);

        let ok = cookie_request(&cookie, Some(&token));
        assert_eq!(config.check(&Method::POST, &ok), CsrfOutcome::Valid);

        let missing = cookie_request(&cookie, None);
        assert_eq!(config.check(&Method::POST, &missing), CsrfOutcome::Missing);

        let other = config.generate_token();
        let mismatch = cookie_request(&cookie, Some(&other));
        assert_eq!(config.check(&Method::DELETE, &mismatch), CsrfOutcome::Invalid);
    }

    #[test]
    fn bearer_and_safe_methods_are_exempt() {
        let config = config();
        let mut headers = cookie_request("session-token=abc", None);
        assert_eq!(config.check(&Method::GET, &headers), CsrfOutcome::Exempt);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer token"),
        );
        assert_eq!(config.check(&Method::POST, &headers), CsrfOutcome::Exempt);

        let anonymous = HeaderMap::new();
        assert!(config.check(&Method::POST, &anonymous).is_allowed());
    }

    #[test]
    fn read_cookie_picks_named_value() {
        let headers = cookie_request("a=1; session-token=xyz ; b=2", None);
        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("xyz"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
