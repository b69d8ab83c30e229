mod common;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use common::TestServer;
use umrah_portal::app::Stores;
use umrah_portal::database::{ListQuery, MemoryStore, RecordStore, StoreError};
use umrah_portal::models::Testimonial;

/// Counts every call that reaches the store
#[derive(Default)]
struct SpyStore {
    inner: MemoryStore<Testimonial>,
    calls: AtomicUsize,
}

impl SpyStore {
    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore<Testimonial> for SpyStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Testimonial>, StoreError> {
        self.touch();
        self.inner.find_by_id(id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<Vec<Testimonial>, StoreError> {
        self.touch();
        self.inner.find_many(query).await
    }

    async fn create(&self, record: &Testimonial) -> Result<Testimonial, StoreError> {
        self.touch();
        self.inner.create(record).await
    }

    async fn update(&self, record: &Testimonial) -> Result<Testimonial, StoreError> {
        self.touch();
        self.inner.update(record).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.touch();
        self.inner.delete(id).await
    }
}

async fn spied_server() -> Result<(TestServer, Arc<SpyStore>)> {
    let spy = Arc::new(SpyStore::default());
    let mut stores = Stores::memory();
    stores.testimonials = spy.clone();
    let server = TestServer::start_with(common::test_config(), stores).await?;
    Ok((server, spy))
}

#[tokio::test]
async fn delete_without_session_never_reaches_the_store() -> Result<()> {
    let (server, spy) = spied_server().await?;

    let res = server.client.delete(server.url("/api/testimonials/abc123")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "error": "Tidak terautentikasi", "code": "UNAUTHORIZED" })
    );

    let res = server
        .client
        .post(server.url("/api/admin/testimonials"))
        .json(&json!({ "name": "X", "message": "Y", "rating": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_body_never_reaches_the_store() -> Result<()> {
    let (server, spy) = spied_server().await?;

    let res = server
        .client
        .post(server.url("/api/testimonials"))
        .header(COOKIE, server.session_cookie()?)
        .json(&json!({ "name": "", "message": "Y", "rating": 0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "VALIDATION");
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn malformed_id_with_session_is_not_found() -> Result<()> {
    let (server, spy) = spied_server().await?;

    let res = server
        .client
        .delete(server.url("/api/testimonials/abc123"))
        .header(COOKIE, server.session_cookie()?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["code"], "NOT_FOUND");
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn testimonial_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;
    let cookie = server.session_cookie()?;

    let res = server
        .client
        .post(server.url("/api/admin/testimonials"))
        .header(COOKIE, &cookie)
        .json(&json!({ "name": "Bu Aminah", "message": "Pembimbing sangat sabar", "rating": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = server
        .client
        .post(server.url("/api/admin/testimonials"))
        .header(COOKIE, &cookie)
        .json(&json!({ "name": "Pak Hasan", "message": "Draf", "rating": 4, "published": false }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Public listing hides unpublished rows, the admin listing does not
    let public = server.client.get(server.url("/api/testimonials")).send().await?.json::<Value>().await?;
    assert_eq!(public["data"].as_array().map(Vec::len), Some(1));
    let admin = server
        .client
        .get(server.url("/api/admin/testimonials"))
        .header(COOKIE, &cookie)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(admin["data"].as_array().map(Vec::len), Some(2));

    let res = server
        .client
        .put(server.url(&format!("/api/testimonials/{id}")))
        .header(COOKIE, &cookie)
        .json(&json!({ "rating": 4, "role": "Jamaah 2025" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["data"]["rating"], 4);
    assert_eq!(updated["data"]["role"], "Jamaah 2025");
    assert_eq!(updated["data"]["name"], "Bu Aminah");

    let res = server
        .client
        .delete(server.url(&format!("/api/admin/testimonials/{id}")))
        .header(COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["id"], id.as_str());

    let res = server
        .client
        .get(server.url(&format!("/api/admin/testimonials/{id}")))
        .header(COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_input_reports_fields() -> Result<()> {
    let server = TestServer::start().await?;
    let cookie = server.session_cookie()?;

    let res = server
        .client
        .post(server.url("/api/admin/testimonials"))
        .header(COOKIE, &cookie)
        .json(&json!({ "name": "Bu Aminah", "message": "Bagus", "rating": 9 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "VALIDATION");
    assert_eq!(body["fields"]["rating"], "rating harus 1 sampai 5");

    let res = server
        .client
        .post(server.url("/api/admin/products"))
        .header(COOKIE, &cookie)
        .json(&json!({ "name": "Umrah Hemat", "slug": "Bukan Slug", "price": "25000000" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "VALIDATION");
    Ok(())
}

#[tokio::test]
async fn list_queries_are_checked() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/api/testimonials?order=password")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.client.get(server.url("/api/testimonials?order=-rating&limit=5")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn slugs_are_unique_and_published_posts_resolve() -> Result<()> {
    let server = TestServer::start().await?;
    let cookie = server.session_cookie()?;

    let post = json!({
        "title": "Persiapan Umrah",
        "slug": "persiapan-umrah",
        "content": "Daftar perlengkapan",
        "published": true
    });
    let res = server
        .client
        .post(server.url("/api/admin/blogs"))
        .header(COOKIE, &cookie)
        .json(&post)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.json::<Value>().await?["data"]["published_at"].is_string());

    let res = server
        .client
        .post(server.url("/api/admin/blogs"))
        .header(COOKIE, &cookie)
        .json(&post)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>().await?["fields"]["slug"].is_string());

    let res = server.client.get(server.url("/api/blogs/persiapan-umrah")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["title"], "Persiapan Umrah");

    let res = server.client.get(server.url("/api/blogs/tidak-ada")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn settings_resolve_by_key() -> Result<()> {
    let server = TestServer::start().await?;
    let cookie = server.session_cookie()?;

    let res = server
        .client
        .post(server.url("/api/settings"))
        .header(COOKIE, &cookie)
        .json(&json!({ "key": "contact.whatsapp", "value": "+6281234567890" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.client.get(server.url("/api/settings/contact.whatsapp")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["value"], "+6281234567890");

    let res = server.client.get(server.url("/api/settings/site.missing")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn text_filters_match_numeric_looking_values() -> Result<()> {
    let server = TestServer::start().await?;
    let cookie = server.session_cookie()?;

    for (title, category) in [("Musim 2024", "2024"), ("Masjid Nabawi", "madinah")] {
        let res = server
            .client
            .post(server.url("/api/admin/galleries"))
            .header(COOKIE, &cookie)
            .json(&json!({ "title": title, "image_url": "https://cdn.example.id/g.jpg", "category": category }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = server.client.get(server.url("/api/galleries?category=2024")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let titles: Vec<_> = body["data"].as_array().into_iter().flatten().map(|g| g["title"].clone()).collect();
    assert_eq!(titles, vec![json!("Musim 2024")]);

    let res = server.client.get(server.url("/api/testimonials?rating=lima")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
