use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::auth::{Session, SessionContext};
use crate::error::{ApiError, VALIDATION_MESSAGE};

/// Handler argument that requires a verified session.
///
/// Place it before any body or path extractor so unauthenticated calls are
/// rejected before anything else is parsed or stored.
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequireSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .and_then(SessionContext::session)
            .cloned()
            .map(RequireSession)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Request-scoped session, anonymous when missing
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<SessionContext>().cloned().unwrap_or_default())
    }
}

/// JSON body deserialized into `T` and checked with `validator`
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

fn rejection_detail(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "Content-Type harus application/json".to_string(),
        JsonRejection::JsonSyntaxError(_) => "JSON tidak dapat dibaca".to_string(),
        other => other.body_text(),
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(VALIDATION_MESSAGE).with_field("body", rejection_detail(&rejection)))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}
