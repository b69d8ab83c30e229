//! Gatekeeper: path-based redirects for the admin dashboard and login page.
//!
//! Runs after `session_middleware`. A request without a `SessionContext`
//! extension is treated as anonymous.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::Url;

use crate::app::AppState;
use crate::auth::SessionContext;
use crate::config::GateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Protected,
    Login,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    /// Same-origin path to redirect to
    Redirect(String),
}

impl PathClass {
    /// The login page wins over the protected subtree, so a login path
    /// nested under the dashboard stays reachable.
    pub fn of(path: &str, gate: &GateConfig) -> Self {
        let dashboard = gate.dashboard_path.as_str();
        let under_dashboard = path
            .strip_prefix(dashboard)
            .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'));

        if path.trim_end_matches('/') == gate.login_path {
            PathClass::Login
        } else if under_dashboard {
            PathClass::Protected
        } else {
            PathClass::Public
        }
    }
}

/// Pure gate decision for one request
pub fn decide(path: &str, authenticated: bool, gate: &GateConfig) -> GateDecision {
    match (PathClass::of(path, gate), authenticated) {
        (PathClass::Protected, false) => GateDecision::Redirect(gate.login_path.clone()),
        (PathClass::Login, true) => GateDecision::Redirect(gate.dashboard_path.clone()),
        _ => GateDecision::Continue,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim())
        .filter(|v| !v.is_empty())
}

/// Origin of the original request, from `Host` or, when trusted, proxy headers
fn request_origin(headers: &HeaderMap, fallback: &str, trust_proxy: bool) -> Option<Url> {
    let fallback = Url::parse(fallback).ok();
    let forwarded = |name: &'static str| if trust_proxy { header_str(headers, name) } else { None };
    let host = forwarded("x-forwarded-host").or_else(|| header_str(headers, header::HOST.as_str()));
    let scheme = forwarded("x-forwarded-proto")
        .filter(|p| matches!(*p, "http" | "https"))
        .map(str::to_string)
        .or_else(|| fallback.as_ref().map(|u| u.scheme().to_string()))
        .unwrap_or_else(|| "http".to_string());

    host.and_then(|h| Url::parse(&format!("{scheme}://{h}")).ok())
        .or(fallback)
}

/// Absolute redirect target; a bare path if no origin is known
pub fn redirect_location(headers: &HeaderMap, fallback_origin: &str, trust_proxy: bool, path: &str) -> String {
    match request_origin(headers, fallback_origin, trust_proxy) {
        Some(mut url) => {
            url.set_path(path);
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        None => path.to_string(),
    }
}

pub async fn gate_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<SessionContext>()
        .map_or(false, SessionContext::is_authenticated);

    match decide(request.uri().path(), authenticated, &state.config.gate) {
        GateDecision::Continue => next.run(request).await,
        GateDecision::Redirect(target) => {
            let server = &state.config.server;
            let location =
                redirect_location(request.headers(), &server.public_origin, server.trust_proxy_headers, &target);
            tracing::debug!("Gate redirect {} -> {}", request.uri().path(), location);
            Redirect::temporary(&location).into_response()
        }
    }
}
