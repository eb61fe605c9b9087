use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use filegate_core::{AppError, Caller};
use serde::{Deserialize, Serialize};

/// Bearer token claims
///
/// Identity servers issuing tokens for .NET clients often use the long
/// WS-Federation claim URIs, so both spellings are accepted. When a token
/// carries both, the short name wins.
#[derive(Debug, Serialize, Deserialize)]
#[serde(from = "RawClaims")]
pub struct JwtClaims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Wire shape with each spelling in its own field
#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default, rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier")]
    name_identifier: Option<String>,
    #[serde(default)]
    role: Option<RoleClaim>,
    #[serde(default, rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role")]
    role_uri: Option<RoleClaim>,
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
}

// A missing identifier becomes "", which `validate_token` rejects.
impl From<RawClaims> for JwtClaims {
    fn from(raw: RawClaims) -> Self {
        JwtClaims {
            sub: raw.sub.or(raw.name_identifier).unwrap_or_default(),
            role: raw.role.or(raw.role_uri),
            exp: raw.exp,
            iat: raw.iat,
            nbf: raw.nbf,
        }
    }
}

/// A role claim is either a single string or an array of strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

impl RoleClaim {
    pub fn into_roles(self) -> Vec<String> {
        match self {
            RoleClaim::One(role) => vec![role],
            RoleClaim::Many(roles) => roles,
        }
    }
}

impl JwtClaims {
    pub fn into_caller(self) -> Caller {
        let roles = self
            .role
            .map(RoleClaim::into_roles)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .collect();
        Caller::new(self.sub, roles)
    }
}

/// Authenticated caller, inserted into request extensions by `auth_middleware`
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for AuthCaller
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCaller>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized("Missing caller identity".to_string()))
            })
    }
}
