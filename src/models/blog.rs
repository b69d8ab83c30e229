use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::{only, set, set_optional, FilterKind, Resource, Slug};
use crate::database::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: Slug,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlogPost {
    #[validate(length(min = 1, max = 200, message = "judul wajib diisi"))]
    pub title: String,
    pub slug: Slug,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, message = "konten wajib diisi"))]
    pub content: String,
    #[validate(url(message = "URL gambar tidak valid"))]
    pub cover_image: Option<String>,
    #[validate(length(max = 120))]
    pub author: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBlogPost {
    #[validate(length(min = 1, max = 200, message = "judul wajib diisi"))]
    pub title: Option<String>,
    pub slug: Option<Slug>,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, message = "konten wajib diisi"))]
    pub content: Option<String>,
    pub cover_image: Option<String>,
    #[validate(length(max = 120))]
    pub author: Option<String>,
    pub published: Option<bool>,
}

impl Record for BlogPost {
    const TABLE: &'static str = "blog_posts";
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "slug", "excerpt", "content", "cover_image", "author", "published", "published_at",
        "created_at", "updated_at",
    ];
    const UNIQUE: &'static [&'static str] = &["slug"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for BlogPost {
    const COLLECTION: &'static str = "blogs";
    const FILTERS: &'static [(&'static str, FilterKind)] = &[("author", FilterKind::Text)];

    type Create = CreateBlogPost;
    type Update = UpdateBlogPost;

    fn create(input: CreateBlogPost, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            cover_image: input.cover_image,
            author: input.author,
            published: input.published,
            published_at: input.published.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateBlogPost, now: DateTime<Utc>) {
        set(&mut self.title, input.title);
        set(&mut self.slug, input.slug);
        set_optional(&mut self.excerpt, input.excerpt);
        set(&mut self.content, input.content);
        set_optional(&mut self.cover_image, input.cover_image);
        set_optional(&mut self.author, input.author);
        set(&mut self.published, input.published);
        // First publication stamps the date; unpublishing keeps it
        if self.published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.updated_at = now;
    }

    fn public_filter() -> Map<String, Value> {
        only("published", true)
    }
}
