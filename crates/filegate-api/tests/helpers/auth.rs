use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

/// Shared HS256 secret (must be at least 32 characters).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

pub const ADMIN_ROLE: &str = "admin";

fn expires_in(seconds: i64) -> i64 {
    chrono::Utc::now().timestamp() + seconds
}

/// Sign a token for `sub` with the given roles (omitted when empty).
pub fn mint_token(sub: &str, roles: &[&str]) -> String {
    mint_token_with_exp(sub, roles, expires_in(3600))
}

pub fn mint_token_with_exp(sub: &str, roles: &[&str], exp: i64) -> String {
    let mut claims = json!({ "sub": sub, "exp": exp, "iat": chrono::Utc::now().timestamp() });
    match roles {
        [] => {}
        [role] => claims["role"] = json!(role),
        many => claims["role"] = json!(many),
    }

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

pub fn admin_token() -> String {
    mint_token("admin-1", &[ADMIN_ROLE])
}

pub fn user_token(id: &str) -> String {
    mint_token(id, &[])
}

pub fn expired_token(id: &str) -> String {
    mint_token_with_exp(id, &[], expires_in(-3600))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
