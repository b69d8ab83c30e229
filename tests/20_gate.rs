mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode as HttpStatus};
use reqwest::header::{COOKIE, LOCATION};
use reqwest::StatusCode;
use tower::ServiceExt;
use uuid::Uuid;

use umrah_portal::app::{app, AppState, Stores};
use umrah_portal::auth::SessionKeys;

#[tokio::test]
async fn anonymous_dashboard_visit_redirects_to_login() -> Result<()> {
    let server = common::TestServer::start().await?;

    for path in ["/dashboard", "/dashboard/", "/dashboard/testimonials"] {
        let res = server.client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(
            res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some(format!("http://127.0.0.1:{}/login", server.port).as_str())
        );
    }
    Ok(())
}

#[tokio::test]
async fn authenticated_login_visit_redirects_to_dashboard() -> Result<()> {
    let server = common::TestServer::start().await?;
    let cookie = server.session_cookie()?;

    let res = server.client.get(server.url("/login")).header(COOKIE, &cookie).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some(format!("http://127.0.0.1:{}/dashboard", server.port).as_str())
    );

    let res = server.client.get(server.url("/dashboard/partners")).header(COOKIE, &cookie).send().await?;
    assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    Ok(())
}

#[tokio::test]
async fn invalid_tokens_count_as_anonymous() -> Result<()> {
    let server = common::TestServer::start().await?;
    let cookie_name = server.state.config.session.cookie_name.clone();

    let foreign = SessionKeys::new(Some("some-other-secret"), 1).issue(Uuid::new_v4(), "x@example.id", "X")?;
    for token in ["not-a-jwt".to_string(), foreign.token] {
        let cookie = format!("{}={}", cookie_name, token);

        let res = server.client.get(server.url("/dashboard")).header(COOKIE, &cookie).send().await?;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);

        let res = server.client.get(server.url("/login")).header(COOKIE, &cookie).send().await?;
        assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    }
    Ok(())
}

#[tokio::test]
async fn unrelated_paths_pass_through() -> Result<()> {
    let server = common::TestServer::start().await?;

    for path in ["/dashboards", "/login-help", "/api/testimonials"] {
        let res = server.client.get(server.url(path)).send().await?;
        assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
    }

    // API routes answer 401 instead of redirecting
    let res = server.client.get(server.url("/api/admin/testimonials")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn redirect_honours_forwarded_headers_when_trusted() -> Result<()> {
    let mut config = common::test_config();
    config.server.trust_proxy_headers = true;
    let server = common::TestServer::start_with(config, Stores::memory()).await?;

    let res = server
        .client
        .get(server.url("/dashboard"))
        .header("x-forwarded-host", "umrah.example.id")
        .header("x-forwarded-proto", "https")
        .send()
        .await?;
    assert_eq!(
        res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some("https://umrah.example.id/login")
    );
    Ok(())
}

#[tokio::test]
async fn forwarded_headers_cannot_pick_the_redirect_host() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/dashboard"))
        .header("x-forwarded-host", "evil.example")
        .header("x-forwarded-proto", "https")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some(format!("http://127.0.0.1:{}/login", server.port).as_str())
    );
    Ok(())
}

#[tokio::test]
async fn router_redirects_without_a_listener() -> Result<()> {
    let state = AppState::new(common::test_config(), Stores::memory());
    let router = app(state);

    let request = Request::builder()
        .uri("/dashboard/settings")
        .header(header::HOST, "portal.example.id")
        .body(Body::empty())?;
    let response = router.oneshot(request).await?;

    assert_eq!(response.status(), HttpStatus::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("http://portal.example.id/login")
    );
    Ok(())
}
