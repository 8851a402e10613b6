//! Account helpers: register through the API, promote through the database.

use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Registered user and its session token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub async fn register_user(client: &TestServer, email: &str) -> TestUser {
    let response = client
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "name": "Test User",
            "password": TEST_PASSWORD,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "register {}", email);

    let body: Value = response.json();
    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("user id in auth response"),
        email: email.to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}

/// Roles are read from the database on every request, so existing tokens
/// pick up the promotion immediately.
pub async fn make_super_admin(pool: &sqlx::PgPool, user: &TestUser) {
    sqlx::query("UPDATE users SET role = 'super_admin' WHERE id = $1")
        .bind(user.id)
        .execute(pool)
        .await
        .expect("Failed to promote user");
}
