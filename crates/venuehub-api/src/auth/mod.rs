//! Session authentication: HS256 tokens, Argon2 passwords and the
//! request extractor carrying the caller's identity.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::{JwtClaims, JwtService};
pub use models::SessionContext;
