mod common;

use anyhow::Result;
use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

async fn visit(server: &TestServer, path: &str, ip: &str) -> Result<StatusCode> {
    let res = server
        .client
        .post(server.url("/api/visitors"))
        .header("x-forwarded-for", ip)
        .header(USER_AGENT, "Mozilla/5.0 (Linux; Android 14)")
        .json(&json!({ "path": path }))
        .send()
        .await?;
    Ok(res.status())
}

#[tokio::test]
async fn visits_are_recorded_anonymously() -> Result<()> {
    let server = TestServer::start().await?;

    assert_eq!(visit(&server, "/", "203.0.113.7").await?, StatusCode::CREATED);
    assert_eq!(visit(&server, "/", "203.0.113.7").await?, StatusCode::CREATED);
    assert_eq!(visit(&server, "/paket", "198.51.100.2").await?, StatusCode::CREATED);

    let res = server.client.get(server.url("/api/visitors/stats")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let stats = server
        .client
        .get(server.url("/api/visitors/stats?days=30"))
        .header(COOKIE, server.session_cookie()?)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(stats["data"]["total_visits"], 3);
    assert_eq!(stats["data"]["unique_visitors"], 2);
    assert_eq!(stats["data"]["today_visits"], 3);
    assert_eq!(stats["data"]["top_paths"][0], json!({ "path": "/", "visits": 2 }));

    let stored = server.state.stores.visits.find_many(&Default::default()).await?;
    assert!(stored.iter().all(|v| !v.visitor_hash.contains("203.0.113.7")));
    Ok(())
}

#[tokio::test]
async fn visit_paths_are_validated() -> Result<()> {
    let server = TestServer::start().await?;

    assert_eq!(visit(&server, "paket", "203.0.113.7").await?, StatusCode::BAD_REQUEST);
    assert_eq!(visit(&server, "", "203.0.113.7").await?, StatusCode::BAD_REQUEST);

    let res = server
        .client
        .get(server.url("/api/visitors/stats?days=0"))
        .header(COOKIE, server.session_cookie()?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
