use serde::{Deserialize, Serialize};
use std::env;

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
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub connect_timeout_secs: u64,
    pub operation_timeout_secs: u64,
    pub ping_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub require_auth: bool,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_SHUTDOWN_GRACE_SECS") {
            self.server.shutdown_grace_secs = v.parse().unwrap_or(self.server.shutdown_grace_secs);
        }

        // Database overrides
        match env::var("DB_CONNECTION") {
            Ok(uri) if !uri.trim().is_empty() => self.database.uri = uri,
            _ => {
                if env::var("DB_HOST").is_ok() || env::var("DB_PORT").is_ok() {
                    self.database.uri = mongodb_uri(
                        env::var("DB_HOST").ok().as_deref(),
                        env::var("DB_PORT").ok().as_deref(),
                    );
                }
            }
        }
        if let Ok(v) = env::var("DB_NAME") {
            if !v.trim().is_empty() {
                self.database.name = v;
            }
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_OPERATION_TIMEOUT_SECS") {
            self.database.operation_timeout_secs = v.parse().unwrap_or(self.database.operation_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_PING_TIMEOUT_SECS") {
            self.database.ping_timeout_secs = v.parse().unwrap_or(self.database.ping_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }
        if let Ok(v) = env::var("API_AVATAR_URL") {
            self.api.avatar_url = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_REQUIRE_AUTH") {
            self.security.require_auth = v.parse().unwrap_or(self.security.require_auth);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                shutdown_grace_secs: 5,
            },
            database: DatabaseConfig {
                uri: mongodb_uri(None, None),
                name: "invoice_db".to_string(),
                connect_timeout_secs: 10,
                operation_timeout_secs: 5,
                ping_timeout_secs: 1,
            },
            api: ApiConfig {
                default_page_size: 25,
                max_page_size: 1000,
                avatar_url: DEFAULT_AVATAR_URL.to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                require_auth: false,
                cors_origins: Vec::new(),
                cookie_secure: false,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.api.max_page_size = 500;
        config.security.require_auth = true;
        config.security.cookie_secure = true;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.api.max_page_size = 100;
        config.server.shutdown_grace_secs = 10;
        config
    }
}

const DEFAULT_AVATAR_URL: &str = "https://ui-avatars.com/api/?name=";

/// Build a connection string from host/port parts, defaulting to a local server.
pub fn mongodb_uri(host: Option<&str>, port: Option<&str>) -> String {
    let host = host.filter(|h| !h.is_empty()).unwrap_or("localhost");
    let port = port.filter(|p| !p.is_empty()).unwrap_or("27017");
    format!("mongodb://{}:{}", host, port)
}
