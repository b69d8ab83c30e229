use std::env;
use std::path::PathBuf;
use url::Url;

/// Process configuration, built once in `main` and shared through `AppState`
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub gate: GateConfig,
    pub security: SecurityConfig,
    pub analytics: AnalyticsConfig,
    pub admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Origin used for redirects when the request carries no usable Host
    pub public_origin: String,
    pub static_dir: PathBuf,
    /// Honour `X-Forwarded-Host`/`X-Forwarded-Proto`; only behind a proxy that sets them
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL. `None` selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC secret for session tokens. `None` means every verification fails.
    pub secret: Option<String>,
    pub expiry_hours: u64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("expiry_hours", &self.expiry_hours)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Paths the gatekeeper guards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub login_path: String,
    pub dashboard_path: String,
}

impl GateConfig {
    /// Apply configured paths. Identical login and dashboard paths would
    /// bounce a signed-in admin forever, so that pair is refused.
    fn overridden(&self, login_path: Option<String>, dashboard_path: Option<String>) -> Self {
        let candidate = GateConfig {
            login_path: login_path.map_or_else(|| self.login_path.clone(), |v| normalize_path(&v)),
            dashboard_path: dashboard_path.map_or_else(|| self.dashboard_path.clone(), |v| normalize_path(&v)),
        };
        if candidate.login_path == candidate.dashboard_path {
            tracing::warn!(
                "Ignoring gate paths: login and dashboard are both {:?}",
                candidate.login_path
            );
            return self.clone();
        }
        candidate
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AnalyticsConfig {
    pub visitor_salt: String,
}

impl std::fmt::Debug for AnalyticsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsConfig").field("visitor_salt", &"<redacted>").finish()
    }
}

/// Admin account created at startup when it does not exist yet
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin").field("email", &self.email).field("name", &self.name).finish()
    }
}

/// Preset salt; good enough for local data, never for production
pub const DEFAULT_VISITOR_SALT: &str = "umrah-portal";

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Normalize a configured path to `/segment[/segment...]` without a trailing slash
fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = non_empty("PORTAL_PORT").or_else(|| non_empty("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = non_empty("PUBLIC_ORIGIN") {
            match Url::parse(&v) {
                Ok(_) => self.server.public_origin = v.trim_end_matches('/').to_string(),
                Err(e) => tracing::warn!("Ignoring invalid PUBLIC_ORIGIN {:?}: {}", v, e),
            }
        }
        if let Some(v) = non_empty("STATIC_DIR") {
            self.server.static_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty("TRUST_PROXY_HEADERS") {
            self.server.trust_proxy_headers = v.parse().unwrap_or(self.server.trust_proxy_headers);
        }

        // Database overrides
        self.database.url = non_empty("DATABASE_URL");
        if let Some(v) = non_empty("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = non_empty("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Session overrides
        self.session.secret = non_empty("SESSION_SECRET");
        if let Some(v) = non_empty("SESSION_EXPIRY_HOURS") {
            self.session.expiry_hours = v.parse().unwrap_or(self.session.expiry_hours);
        }
        if let Some(v) = non_empty("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Some(v) = non_empty("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }

        // Gate overrides
        self.gate = self.gate.overridden(non_empty("GATE_LOGIN_PATH"), non_empty("GATE_DASHBOARD_PATH"));

        // Security overrides
        if let Some(v) = non_empty("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = non_empty("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        if let Some(v) = non_empty("VISITOR_SALT") {
            self.analytics.visitor_salt = v;
        }

        if let (Some(email), Some(password_hash)) = (non_empty("ADMIN_EMAIL"), non_empty("ADMIN_PASSWORD_HASH")) {
            self.admin = Some(BootstrapAdmin {
                email: email.to_lowercase(),
                name: non_empty("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
                password_hash,
            });
        }

        self
    }

    fn base(environment: Environment, public_origin: &str) -> Self {
        Self {
            environment,
            server: ServerConfig {
                port: 3000,
                public_origin: public_origin.to_string(),
                static_dir: PathBuf::from("public"),
                trust_proxy_headers: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            session: SessionConfig {
                secret: None,
                expiry_hours: 24,
                cookie_name: "session_token".to_string(),
                cookie_secure: true,
            },
            gate: GateConfig {
                login_path: "/login".to_string(),
                dashboard_path: "/dashboard".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
            analytics: AnalyticsConfig {
                visitor_salt: DEFAULT_VISITOR_SALT.to_string(),
            },
            admin: None,
        }
    }

    pub fn development() -> Self {
        let mut config = Self::base(Environment::Development, "http://localhost:3000");
        config.session.expiry_hours = 24 * 7;
        config.session.cookie_secure = false;
        config.security.cors_origins = vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
        ];
        config
    }

    pub fn staging() -> Self {
        let mut config = Self::base(Environment::Staging, "https://staging.example.com");
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    pub fn production() -> Self {
        let mut config = Self::base(Environment::Production, "https://example.com");
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.session.expiry_hours = 8;
        config.security.cors_origins = vec!["https://example.com".to_string()];
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Startup checks for settings the presets cannot supply safely
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.analytics.visitor_salt == DEFAULT_VISITOR_SALT {
            if self.is_production() {
                anyhow::bail!("VISITOR_SALT must be set in production");
            }
            tracing::warn!("VISITOR_SALT not set: visitor hashes use the built-in salt");
        }
        Ok(())
    }
}
