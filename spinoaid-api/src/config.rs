/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. Business logic never reads the
/// environment itself; `main` builds one [`Config`] and hands it down.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `JWT_SECRET`: Secret key for token signing (default: an insecure development key)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` allows any
/// - `STORAGE_BACKEND`: `memory` (default) or `mock`
/// - `IDENTITY_RESOLUTION`: `placeholder` (default) or `lookup`
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use spinoaid_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use spinoaid_shared::auth::middleware::IdentityResolution;
use std::{env, fmt, str::FromStr};

/// Development signing key used when `JWT_SECRET` is unset
pub const DEFAULT_JWT_SECRET: &str = "spinoaid-secret-key-change-in-production";

/// Origins allowed when `CORS_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,http://localhost:3000,http://localhost:8080,*";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Authentication configuration
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` means any)
    pub cors_origins: Vec<String>,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// Override the default in any shared deployment.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

impl JwtConfig {
    /// True when running with the built-in development key
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process document store
    #[default]
    Memory,

    /// Accepts writes and stores nothing
    Mock,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "mock" => Ok(StorageBackend::Mock),
            other => Err(format!("Unknown storage backend '{}'", other)),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// How a verified token subject becomes a caller identity
    pub identity: IdentityResolution,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// Reads a `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds configuration from a variable lookup
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = var("API_PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;

        let cors_origins = parse_origins(
            &var("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let jwt_secret = var("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>().map_err(anyhow::Error::msg)?,
            None => StorageBackend::default(),
        };

        let identity = match var("IDENTITY_RESOLUTION") {
            Some(value) => value
                .parse::<IdentityResolution>()
                .map_err(anyhow::Error::msg)?,
            None => IdentityResolution::default(),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            jwt: JwtConfig { secret: jwt_secret },
            storage: StorageConfig { backend },
            auth: AuthConfig { identity },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
