//! Admin login, logout and session introspection.
//!
//! The session token travels only in an HttpOnly cookie; it is never part
//! of a response body.

use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::auth::{PasswordHasher, Session, DUMMY_PASSWORD_HASH};
use crate::database::ListQuery;
use crate::error::{ApiError, Failure, LogOperation};
use crate::middleware::{ApiResponse, ApiResult, RequireSession, ValidJson};

pub const BAD_CREDENTIALS_MESSAGE: &str = "Email atau kata sandi salah";

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "format email tidak valid"))]
    pub email: String,
    #[validate(length(min = 1, max = 256, message = "kata sandi wajib diisi"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoggedOut {
    pub logged_out: bool,
}

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((state.config.session.cookie_name.clone(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session.cookie_secure)
        .build()
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<Session>), Failure> {
    if !state.sessions.is_configured() {
        tracing::error!("Login attempted but SESSION_SECRET is not configured");
        return Err(ApiError::internal().into());
    }

    let email = request.email.trim().to_lowercase();
    let user = state
        .stores
        .admin_users
        .find_one(&ListQuery::new().eq("email", email.clone()))
        .await
        .log_operation("auth.login")?;

    // argon2 verification blocks; unknown accounts pay the same cost
    let password = request.password;
    let hash = user
        .as_ref()
        .map_or_else(|| DUMMY_PASSWORD_HASH.to_string(), |u| u.password_hash.clone());
    let matches = tokio::task::spawn_blocking(move || PasswordHasher::new().verify_password(&password, &hash))
        .await
        .map_err(anyhow::Error::from)
        .log_operation("auth.login")?
        .log_operation("auth.login")?;

    let user = match user {
        Some(user) if matches => user,
        Some(_) => {
            tracing::info!(email = %email, "Login rejected: wrong password");
            return Err(ApiError::unauthorized_with(BAD_CREDENTIALS_MESSAGE).into());
        }
        None => {
            tracing::info!(email = %email, "Login rejected: unknown account");
            return Err(ApiError::unauthorized_with(BAD_CREDENTIALS_MESSAGE).into());
        }
    };

    let issued = state
        .sessions
        .issue(user.id, &user.email, &user.name)
        .map_err(anyhow::Error::from)
        .log_operation("auth.login")?;

    tracing::info!(email = %user.email, "Admin logged in");
    let jar = jar.add(session_cookie(&state, issued.token));
    Ok((jar, ApiResponse::success(issued.session)))
}

/// POST /api/auth/logout - always succeeds, with or without a session
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, ApiResponse<LoggedOut>) {
    let jar = jar.remove(Cookie::build((state.config.session.cookie_name.clone(), "")).path("/"));
    (jar, ApiResponse::success(LoggedOut { logged_out: true }))
}

/// GET /api/auth/session
pub async fn current_session(RequireSession(session): RequireSession) -> ApiResult<Session> {
    Ok(ApiResponse::success(session))
}
