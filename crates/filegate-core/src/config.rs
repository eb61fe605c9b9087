//! Configuration module
//!
//! The configuration is read once at startup from the environment (and an
//! optional `.env` file), validated, and then passed explicitly to the
//! components that need it. Nothing here is process-wide mutable state.

use std::env;
use std::path::{Path, PathBuf};

use crate::validation::ExtensionWhitelist;

const SERVER_PORT: u16 = 4000;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const JWKS_CACHE_TTL_SECS: i64 = 3600;
const WEB_ROOT: &str = "wwwroot";
const ADMIN_ROLE: &str = "admin";
const BANNER_ALLOWED_EXTENSIONS: &str = ".jpg,.jpeg,.png,.gif";
const FILE_ALLOWED_EXTENSIONS: &str = ".pdf";

/// Bearer token verification settings
#[derive(Clone, Debug)]
pub struct BearerConfig {
    /// Token issuer base address (e.g. an OpenID Connect identity server)
    pub authority: Option<String>,
    /// Expected `aud` claim
    pub audience: Option<String>,
    /// JWKS endpoint; derived from the authority when unset
    pub jwks_url: Option<String>,
    pub jwks_cache_ttl_secs: i64,
    /// Shared HS256 secret, an alternative to the authority for development
    pub jwt_secret: Option<String>,
}

impl BearerConfig {
    /// JWKS endpoint to fetch signing keys from, if asymmetric verification is configured.
    pub fn jwks_url(&self) -> Option<String> {
        self.jwks_url.clone().or_else(|| {
            self.authority.as_ref().map(|authority| {
                format!(
                    "{}/.well-known/openid-configuration/jwks",
                    authority.trim_end_matches('/')
                )
            })
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// URL prefix the service is mounted under, normalized to `""` or `/segment[/...]`
    pub base_path: String,
    /// Storage root all uploads are written under
    pub web_root: PathBuf,
    /// Serve stored files read-only under `/upload`
    pub serve_uploads: bool,
    pub max_upload_size_bytes: usize,
    pub http_concurrency_limit: usize,
    pub bearer: BearerConfig,
    /// Role required for banner management
    pub admin_role: String,
    pub banner_allowed_extensions: ExtensionWhitelist,
    pub file_allowed_extensions: ExtensionWhitelist,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let bearer = BearerConfig {
            authority: non_empty_var("BEARER_AUTHORITY"),
            audience: non_empty_var("BEARER_AUDIENCE"),
            jwks_url: non_empty_var("JWKS_URL"),
            jwks_cache_ttl_secs: env::var("JWKS_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(JWKS_CACHE_TTL_SECS),
            jwt_secret: non_empty_var("JWT_SECRET"),
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            base_path: normalize_base_path(&env::var("BASE_PATH").unwrap_or_default()),
            web_root: PathBuf::from(env::var("WEB_ROOT").unwrap_or_else(|_| WEB_ROOT.to_string())),
            serve_uploads: env::var("SERVE_UPLOADS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            bearer,
            admin_role: env::var("ADMIN_ROLE").unwrap_or_else(|_| ADMIN_ROLE.to_string()),
            banner_allowed_extensions: ExtensionWhitelist::parse(
                &env::var("BANNER_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| BANNER_ALLOWED_EXTENSIONS.to_string()),
            ),
            file_allowed_extensions: ExtensionWhitelist::parse(
                &env::var("FILE_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| FILE_ALLOWED_EXTENSIONS.to_string()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration suitable for tests: HS256 secret, storage under `web_root`.
    pub fn for_tests(web_root: impl AsRef<Path>, jwt_secret: impl Into<String>) -> Self {
        Config {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            base_path: String::new(),
            web_root: web_root.as_ref().to_path_buf(),
            serve_uploads: true,
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            bearer: BearerConfig {
                authority: None,
                audience: None,
                jwks_url: None,
                jwks_cache_ttl_secs: JWKS_CACHE_TTL_SECS,
                jwt_secret: Some(jwt_secret.into()),
            },
            admin_role: ADMIN_ROLE.to_string(),
            banner_allowed_extensions: ExtensionWhitelist::parse(BANNER_ALLOWED_EXTENSIONS),
            file_allowed_extensions: ExtensionWhitelist::parse(FILE_ALLOWED_EXTENSIONS),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        match (&self.bearer.authority, &self.bearer.jwt_secret) {
            (None, None) => {
                return Err(anyhow::anyhow!(
                    "Either BEARER_AUTHORITY or JWT_SECRET must be set for authentication"
                ));
            }
            (Some(_), Some(_)) => {
                return Err(anyhow::anyhow!(
                    "BEARER_AUTHORITY and JWT_SECRET are mutually exclusive"
                ));
            }
            (None, Some(secret)) => {
                if secret.len() < 32 {
                    return Err(anyhow::anyhow!(
                        "JWT_SECRET must be at least 32 characters long"
                    ));
                }
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "JWT_SECRET is for development only; set BEARER_AUTHORITY in production"
                    ));
                }
            }
            (Some(authority), None) => {
                if !authority.starts_with("https://") && !authority.starts_with("http://") {
                    return Err(anyhow::anyhow!(
                        "BEARER_AUTHORITY must be an http(s) URL"
                    ));
                }
            }
        }

        if self.admin_role.trim().is_empty() {
            return Err(anyhow::anyhow!("ADMIN_ROLE cannot be empty"));
        }

        if self.banner_allowed_extensions.is_empty() || self.file_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "BANNER_ALLOWED_EXTENSIONS and FILE_ALLOWED_EXTENSIONS cannot be empty"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }

        if self.web_root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("WEB_ROOT cannot be empty"));
        }

        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Normalize a mount prefix to `""` or `/a/b` (leading slash, no trailing slash).
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
