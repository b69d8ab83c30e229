#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, SET_COOKIE};
use uuid::Uuid;

use umrah_portal::app::{app, bootstrap_admin, AppState, Stores};
use umrah_portal::auth::PasswordHasher;
use umrah_portal::config::{AppConfig, BootstrapAdmin};

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@umrah.example.id";
pub const ADMIN_PASSWORD: &str = "labbaik-allahumma";

/// Development preset with a known secret and no env lookups
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.session.secret = Some(SECRET.to_string());
    config.server.static_dir = std::env::temp_dir().join("umrah-portal-tests-no-static");
    config
}

pub fn with_admin(mut config: AppConfig) -> Result<AppConfig> {
    config.admin = Some(BootstrapAdmin {
        email: ADMIN_EMAIL.to_string(),
        name: "Admin Travel".to_string(),
        password_hash: PasswordHasher::new().hash_password(ADMIN_PASSWORD)?,
    });
    Ok(config)
}

/// In-process server on a free port, living as long as the test's runtime
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(test_config(), Stores::memory()).await
    }

    pub async fn start_with(config: AppConfig, stores: Stores) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(config, stores);
        bootstrap_admin(&state).await?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", port))?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        // Redirects are asserted on, never followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            port,
            base_url,
            state,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `Cookie` header value carrying a freshly issued session
    pub fn session_cookie(&self) -> Result<String> {
        let issued = self.state.sessions.issue(Uuid::new_v4(), ADMIN_EMAIL, "Admin Travel")?;
        Ok(format!("{}={}", self.state.config.session.cookie_name, issued.token))
    }
}

/// The `Set-Cookie` header for `name`, if any
pub fn set_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
}
