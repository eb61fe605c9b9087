//! Bearer token validation
//!
//! Tokens are either signed with a shared HS256 secret (development and tests)
//! or with RS256/ES256 keys published by the token authority as a JWKS document.
//! JWKS keys are cached per `kid` and refetched once the cache entry expires,
//! which picks up key rotation.

use crate::auth::models::JwtClaims;
use filegate_core::{AppError, BearerConfig};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

#[cfg(feature = "jwt-rs256")]
pub use jwks::{Jwk, Jwks, JwksKeySource};

enum KeySource {
    Shared(DecodingKey),
    #[cfg(feature = "jwt-rs256")]
    Jwks(JwksKeySource),
}

/// Validates bearer tokens against the configured key source
pub struct JwtService {
    keys: KeySource,
    audience: Option<String>,
    issuer: Option<String>,
}

impl JwtService {
    /// HS256 validation with a shared secret
    pub fn hs256(secret: &str) -> Self {
        Self {
            keys: KeySource::Shared(DecodingKey::from_secret(secret.as_bytes())),
            audience: None,
            issuer: None,
        }
    }

    /// Build from configuration. The authority, when set, is also the expected issuer.
    pub fn from_config(bearer: &BearerConfig) -> Result<Self, anyhow::Error> {
        let keys = if let Some(secret) = bearer.jwt_secret.as_deref() {
            KeySource::Shared(DecodingKey::from_secret(secret.as_bytes()))
        } else {
            Self::jwks_source(bearer)?
        };

        Ok(Self {
            keys,
            audience: bearer.audience.clone(),
            issuer: bearer
                .authority
                .as_ref()
                .map(|authority| authority.trim_end_matches('/').to_string()),
        })
    }

    #[cfg(feature = "jwt-rs256")]
    fn jwks_source(bearer: &BearerConfig) -> Result<KeySource, anyhow::Error> {
        let url = bearer.jwks_url().ok_or_else(|| {
            anyhow::anyhow!("Either JWT_SECRET or BEARER_AUTHORITY must be set")
        })?;
        tracing::info!(jwks_url = %url, "Bearer tokens validated against JWKS");
        Ok(KeySource::Jwks(JwksKeySource::new(
            url,
            Some(bearer.jwks_cache_ttl_secs),
        )))
    }

    #[cfg(not(feature = "jwt-rs256"))]
    fn jwks_source(_bearer: &BearerConfig) -> Result<KeySource, anyhow::Error> {
        Err(anyhow::anyhow!(
            "BEARER_AUTHORITY requires the jwt-rs256 feature; set JWT_SECRET instead"
        ))
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Validate and decode a token
    pub async fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token header: {}", e)))?;

        let (decoding_key, algorithms) = match &self.keys {
            KeySource::Shared(key) => (key.clone(), vec![Algorithm::HS256]),
            #[cfg(feature = "jwt-rs256")]
            KeySource::Jwks(source) => (
                source.get_decoding_key(header.kid.as_deref()).await?,
                vec![Algorithm::RS256, Algorithm::ES256],
            ),
        };

        if !algorithms.contains(&header.alg) {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Supported: {:?}",
                header.alg, algorithms
            )));
        }

        let mut validation = Validation::new(header.alg);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.algorithms = algorithms;
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<JwtClaims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::Unauthorized("Invalid token issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AppError::Unauthorized("Invalid token audience".to_string())
                }
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
            }
        })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("Token has no subject".to_string()));
        }

        Ok(token_data.claims)
    }
}

#[cfg(feature = "jwt-rs256")]
mod jwks {
    use chrono::{DateTime, Utc};
    use filegate_core::AppError;
    use jsonwebtoken::DecodingKey;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// JWKS (JSON Web Key Set) structure
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Jwks {
        pub keys: Vec<Jwk>,
    }

    /// JSON Web Key structure
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Jwk {
        #[serde(rename = "kty")]
        pub key_type: String,
        #[serde(rename = "kid")]
        pub key_id: Option<String>,
        #[serde(rename = "use")]
        pub key_use: Option<String>,
        #[serde(rename = "alg")]
        pub algorithm: Option<String>,
        #[serde(rename = "n")]
        pub modulus: Option<String>, // RSA
        #[serde(rename = "e")]
        pub exponent: Option<String>, // RSA
        #[serde(rename = "x")]
        pub x_coordinate: Option<String>, // EC
        #[serde(rename = "y")]
        pub y_coordinate: Option<String>, // EC
        #[serde(rename = "crv")]
        pub curve: Option<String>, // EC
    }

    #[derive(Clone)]
    struct CachedKey {
        key: DecodingKey,
        expires_at: DateTime<Utc>,
    }

    /// Signing keys fetched from a JWKS endpoint, cached per key id
    pub struct JwksKeySource {
        jwks_url: String,
        client: reqwest::Client,
        cache: Arc<RwLock<HashMap<String, CachedKey>>>,
        cache_ttl_seconds: i64,
    }

    impl JwksKeySource {
        pub fn new(jwks_url: String, cache_ttl_seconds: Option<i64>) -> Self {
            Self {
                jwks_url,
                client: reqwest::Client::new(),
                cache: Arc::new(RwLock::new(HashMap::new())),
                cache_ttl_seconds: cache_ttl_seconds.unwrap_or(3600),
            }
        }

        async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
            let response = self
                .client
                .get(&self.jwks_url)
                .send()
                .await
                .map_err(|e| AppError::Unauthorized(format!("Failed to fetch JWKS: {}", e)))?;

            if !response.status().is_success() {
                return Err(AppError::Unauthorized(format!(
                    "JWKS endpoint returned error: {}",
                    response.status()
                )));
            }

            response
                .json()
                .await
                .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWKS: {}", e)))
        }

        pub async fn get_decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
            let cache_key = kid.unwrap_or("default").to_string();

            {
                let cache = self.cache.read().await;
                if let Some(cached) = cache.get(&cache_key) {
                    if cached.expires_at > Utc::now() {
                        return Ok(cached.key.clone());
                    }
                }
            }

            let jwks = self.fetch_jwks().await?;
            let jwk = select_key(&jwks, kid)?;
            let decoding_key = jwk_to_decoding_key(jwk)?;

            self.cache.write().await.insert(
                cache_key,
                CachedKey {
                    key: decoding_key.clone(),
                    expires_at: Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds),
                },
            );

            Ok(decoding_key)
        }
    }

    /// Key matching `kid`, or the first key when the token names none
    pub(super) fn select_key<'a>(jwks: &'a Jwks, kid: Option<&str>) -> Result<&'a Jwk, AppError> {
        match kid {
            Some(kid) => jwks
                .keys
                .iter()
                .find(|k| k.key_id.as_deref() == Some(kid))
                .ok_or_else(|| AppError::Unauthorized(format!("Key ID {} not found in JWKS", kid))),
            None => jwks
                .keys
                .first()
                .ok_or_else(|| AppError::Unauthorized("No keys found in JWKS".to_string())),
        }
    }

    pub(super) fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
        match jwk.key_type.as_str() {
            "RSA" => {
                let n = jwk
                    .modulus
                    .as_ref()
                    .ok_or_else(|| AppError::Unauthorized("RSA key missing modulus".to_string()))?;
                let e = jwk.exponent.as_ref().ok_or_else(|| {
                    AppError::Unauthorized("RSA key missing exponent".to_string())
                })?;
                DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| AppError::Unauthorized(format!("Failed to create RSA key: {}", e)))
            }
            "EC" => {
                let x = jwk.x_coordinate.as_ref().ok_or_else(|| {
                    AppError::Unauthorized("EC key missing x coordinate".to_string())
                })?;
                let y = jwk.y_coordinate.as_ref().ok_or_else(|| {
                    AppError::Unauthorized("EC key missing y coordinate".to_string())
                })?;
                let curve = jwk
                    .curve
                    .as_deref()
                    .ok_or_else(|| AppError::Unauthorized("EC key missing curve".to_string()))?;
                if curve != "P-256" {
                    return Err(AppError::Unauthorized(format!(
                        "Unsupported EC curve: {} (only P-256 is supported)",
                        curve
                    )));
                }
                DecodingKey::from_ec_components(x, y)
                    .map_err(|e| AppError::Unauthorized(format!("Failed to create EC key: {}", e)))
            }
            other => Err(AppError::Unauthorized(format!("Unsupported key type: {}", other))),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_an_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn test_valid_hs256_token() {
        let service = JwtService::hs256(SECRET);
        let jwt = token(
            serde_json::json!({ "sub": "u1", "role": "admin", "exp": in_an_hour() }),
            SECRET,
        );
        let claims = service.validate_token(&jwt).await.unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let service = JwtService::hs256(SECRET);
        let jwt = token(
            serde_json::json!({ "sub": "u1", "exp": in_an_hour() }),
            "another-secret-that-is-at-least-32-chars",
        );
        assert!(matches!(
            service.validate_token(&jwt).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let service = JwtService::hs256(SECRET);
        let jwt = token(
            serde_json::json!({ "sub": "u1", "exp": chrono::Utc::now().timestamp() - 60 }),
            SECRET,
        );
        match service.validate_token(&jwt).await {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("Expected Unauthorized, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[tokio::test]
    async fn test_audience_and_issuer_enforced_when_configured() {
        let service = JwtService::hs256(SECRET)
            .with_audience("filegate")
            .with_issuer("https://id.example.com");

        let good = token(
            serde_json::json!({
                "sub": "u1",
                "aud": "filegate",
                "iss": "https://id.example.com",
                "exp": in_an_hour()
            }),
            SECRET,
        );
        assert!(service.validate_token(&good).await.is_ok());

        let wrong_audience = token(
            serde_json::json!({
                "sub": "u1",
                "aud": "other",
                "iss": "https://id.example.com",
                "exp": in_an_hour()
            }),
            SECRET,
        );
        assert!(service.validate_token(&wrong_audience).await.is_err());
    }

    #[tokio::test]
    async fn test_audience_ignored_when_not_configured() {
        let service = JwtService::hs256(SECRET);
        let jwt = token(
            serde_json::json!({ "sub": "u1", "aud": "anything", "exp": in_an_hour() }),
            SECRET,
        );
        assert!(service.validate_token(&jwt).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_subject_rejected() {
        let service = JwtService::hs256(SECRET);
        let jwt = token(serde_json::json!({ "sub": "", "exp": in_an_hour() }), SECRET);
        assert!(service.validate_token(&jwt).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let service = JwtService::hs256(SECRET);
        assert!(service.validate_token("not-a-jwt").await.is_err());
    }

    #[test]
    fn test_from_config_requires_a_key_source() {
        let bearer = BearerConfig {
            authority: None,
            audience: None,
            jwks_url: None,
            jwks_cache_ttl_secs: 3600,
            jwt_secret: None,
        };
        assert!(JwtService::from_config(&bearer).is_err());
    }
}
