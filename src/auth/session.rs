use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SessionConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret not configured")]
    MissingSecret,

    #[error("session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("invalid session token: {0}")]
    InvalidToken(String),
}

/// A verified session, valid for the request it was verified on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

/// Request-scoped authentication state.
///
/// Built once per request by the session middleware and stored in the
/// request extensions. Anything that failed verification is anonymous.
#[derive(Debug, Clone, Default)]
pub struct SessionContext(Option<Session>);

impl SessionContext {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(session: Session) -> Self {
        Self(Some(session))
    }

    pub fn session(&self) -> Option<&Session> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

pub struct IssuedToken {
    pub token: String,
    pub session: Session,
}

/// Signs and verifies session tokens (HS256 JWT)
pub struct SessionKeys {
    secret: Option<Vec<u8>>,
    expiry: Duration,
}

impl SessionKeys {
    pub fn new(secret: Option<&str>, expiry_hours: u64) -> Self {
        let hours = i64::try_from(expiry_hours).unwrap_or(24);
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(|s| s.as_bytes().to_vec()),
            expiry: Duration::hours(hours),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.secret.as_deref(), config.expiry_hours)
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    fn secret(&self) -> Result<&[u8], SessionError> {
        self.secret.as_deref().ok_or(SessionError::MissingSecret)
    }

    pub fn issue(&self, user_id: Uuid, email: &str, name: &str) -> Result<IssuedToken, SessionError> {
        self.issue_at(user_id, email, name, Utc::now())
    }

    fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, SessionError> {
        let secret = self.secret()?;
        let expires_at = now + self.expiry;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            name: name.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
            .map_err(|e| SessionError::TokenGeneration(e.to_string()))?;

        Ok(IssuedToken {
            token,
            session: Session {
                user_id,
                email: claims.email,
                name: claims.name,
                expires_at,
            },
        })
    }

    /// Verify signature and expiry. Checked on every call, nothing is cached.
    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let secret = self.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|e| SessionError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| SessionError::InvalidToken("exp out of range".to_string()))?;

        Ok(Session {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            expires_at,
        })
    }

    /// Verification collapsed to the gate's view: any failure is anonymous
    pub fn context_for(&self, token: Option<&str>) -> SessionContext {
        match token.map(|t| self.verify(t)) {
            Some(Ok(session)) => SessionContext::authenticated(session),
            Some(Err(e)) => {
                tracing::debug!("Session verification failed: {}", e);
                SessionContext::anonymous()
            }
            None => SessionContext::anonymous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(Some("test-secret"), 1)
    }

    #[test]
    fn issued_tokens_verify() {
        let id = Uuid::new_v4();
        let issued = keys().issue(id, "admin@example.com", "Admin").unwrap();
        let session = keys().verify(&issued.token).unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(session.email, "admin@example.com");
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let long_ago = Utc::now() - Duration::hours(5);
        let issued = keys().issue_at(Uuid::new_v4(), "a@b.c", "A", long_ago).unwrap();
        assert!(matches!(keys().verify(&issued.token), Err(SessionError::InvalidToken(_))));
        assert!(!keys().context_for(Some(&issued.token)).is_authenticated());
    }

    #[test]
    fn tokens_from_other_secrets_are_rejected() {
        let other = SessionKeys::new(Some("other-secret"), 1);
        let issued = other.issue(Uuid::new_v4(), "a@b.c", "A").unwrap();
        assert!(keys().verify(&issued.token).is_err());
    }

    #[test]
    fn missing_secret_fails_closed() {
        let keys = SessionKeys::new(None, 1);
        assert!(!keys.is_configured());
        assert!(matches!(keys.issue(Uuid::new_v4(), "a@b.c", "A"), Err(SessionError::MissingSecret)));
        assert!(matches!(keys.verify("anything"), Err(SessionError::MissingSecret)));
        assert!(!keys.context_for(Some("anything")).is_authenticated());

        let empty = SessionKeys::new(Some(""), 1);
        assert!(!empty.is_configured());
    }

    #[test]
    fn garbage_is_anonymous() {
        assert!(!keys().context_for(Some("not.a.jwt")).is_authenticated());
        assert!(!keys().context_for(None).is_authenticated());
    }
}
