use serde::{Deserialize, Serialize};
use std::{env, fmt, fs};
use thiserror::Error;

/// Upper bound for `SECURITY_JWT_EXPIRY_HOURS` (ten years)
const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to read JWT secret file {path}: {source}")]
    SecretFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing, default)]
    pub url: String,
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing, default)]
    pub jwt_secret: Secret,
    /// `None` issues tokens without `exp` and skips expiry validation
    pub jwt_expiry_hours: Option<u64>,
    pub self_or_admin: SelfOrAdminPolicy,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub min_password_length: usize,
}

/// How the self-or-admin guard decides after authentication succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfOrAdminPolicy {
    /// Every authenticated caller passes; the path id is compared with itself.
    Observed,
    /// Caller must own the target account or hold the ADMIN role.
    #[default]
    Corrected,
}

impl std::str::FromStr for SelfOrAdminPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "observed" | "permissive" => Ok(SelfOrAdminPolicy::Observed),
            "corrected" | "strict" => Ok(SelfOrAdminPolicy::Corrected),
            _ => Err(()),
        }
    }
}

/// Signing secret. Never printed.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.apply_overrides(&get)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, get: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = get("HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = parse("PORT", &v)?;
        }

        // Database
        self.database.url = get("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = parse("DATABASE_ACQUIRE_TIMEOUT_SECS", &v)?;
        }

        // API
        if let Some(v) = get("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse("API_ENABLE_REQUEST_LOGGING", &v)?;
        }
        if let Some(v) = get("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }

        // Security
        self.security.jwt_secret = load_secret(get)?;
        if let Some(v) = get("SECURITY_JWT_EXPIRY_HOURS") {
            let hours: u64 = parse("SECURITY_JWT_EXPIRY_HOURS", &v)?;
            if hours > MAX_JWT_EXPIRY_HOURS {
                return Err(ConfigError::Invalid {
                    key: "SECURITY_JWT_EXPIRY_HOURS",
                    value: v.clone(),
                });
            }
            self.security.jwt_expiry_hours = (hours > 0).then_some(hours);
        }
        if let Some(v) = get("SECURITY_SELF_OR_ADMIN_MODE") {
            self.security.self_or_admin = v.parse().map_err(|_| ConfigError::Invalid {
                key: "SECURITY_SELF_OR_ADMIN_MODE",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = get("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = get("SECURITY_MIN_PASSWORD_LENGTH") {
            self.security.min_password_length = parse("SECURITY_MIN_PASSWORD_LENGTH", &v)?;
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                jwt_secret: Secret::default(),
                jwt_expiry_hours: None,
                self_or_admin: SelfOrAdminPolicy::Corrected,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                min_password_length: 8,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: Secret::default(),
                jwt_expiry_hours: None,
                self_or_admin: SelfOrAdminPolicy::Corrected,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                min_password_length: 12,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                acquire_timeout_secs: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 64 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: Secret::default(),
                jwt_expiry_hours: None,
                self_or_admin: SelfOrAdminPolicy::Corrected,
                enable_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
                min_password_length: 12,
            },
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

/// `JWT_SECRET` wins over `JWT_SECRET_FILE`; one of them is required.
fn load_secret<F>(get: &F) -> Result<Secret, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = get("JWT_SECRET").filter(|s| !s.is_empty()) {
        return Ok(Secret::new(secret));
    }

    if let Some(path) = get("JWT_SECRET_FILE") {
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
            path: path.clone(),
            source,
        })?;
        let secret = contents.trim_end_matches(['\r', '\n']);
        if secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET_FILE contents"));
        }
        return Ok(Secret::new(secret));
    }

    Err(ConfigError::Missing("JWT_SECRET or JWT_SECRET_FILE"))
}
