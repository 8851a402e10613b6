//! HS256 session tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use venuehub_core::models::{User, UserRole};
use venuehub_core::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    pub sub: Uuid,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours.max(1)),
        }
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.expiry.num_seconds()
    }

    /// Issue a token for `user`, returning it with its expiry instant.
    pub fn issue(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.expiry;
        let claims = JwtClaims {
            sub: user.id,
            role: user.role,
            tenant_id: user.tenant_id,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))?;
        Ok((token, expires_at))
    }

    /// Validate and decode a session token
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Session has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                        AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
                    }
                    _ => AppError::Unauthorized("Invalid session token".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

    fn user(role: UserRole, tenant_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "owner@greenfield.test".to_string(),
            name: "Owner".to_string(),
            phone: None,
            password_hash: String::new(),
            role,
            tenant_id,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let service = JwtService::new(SECRET, 24);
        let tenant = Uuid::new_v4();
        let admin = user(UserRole::TenantAdmin, Some(tenant));
        let (token, expires_at) = service.issue(&admin).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, UserRole::TenantAdmin);
        assert_eq!(claims.tenant_id, Some(tenant));
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = JwtService::new(SECRET, 24);
        let (token, _) = issuer.issue(&user(UserRole::Customer, None)).unwrap();
        let other = JwtService::new("another-secret-key-that-is-32-chars-long", 24);
        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = JwtService::new(SECRET, 24);
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: Uuid::new_v4(),
            role: UserRole::Customer,
            tenant_id: None,
            exp: now - 60,
            iat: now - 120,
            nbf: now - 120,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        match service.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("expected expiry rejection, got {:?}", other),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let service = JwtService::new(SECRET, 24);
        assert!(service.verify("not.a.token").is_err());
    }
}
