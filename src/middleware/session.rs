use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::app::AppState;

/// Verify the session cookie once and store the result as a request-scoped
/// `SessionContext` extension. Never rejects; downstream decides.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar.get(&state.config.session.cookie_name).map(|c| c.value().to_string());
    let context = state.sessions.context_for(token.as_deref());

    request.extensions_mut().insert(context);

    next.run(request).await
}
