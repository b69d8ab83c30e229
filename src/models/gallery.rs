use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{set, set_optional, FilterKind, Resource};
use crate::database::{Order, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGallery {
    #[validate(length(min = 1, max = 200, message = "judul wajib diisi"))]
    pub title: String,
    #[validate(url(message = "URL gambar tidak valid"))]
    pub image_url: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 60))]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGallery {
    #[validate(length(min = 1, max = 200, message = "judul wajib diisi"))]
    pub title: Option<String>,
    #[validate(url(message = "URL gambar tidak valid"))]
    pub image_url: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 60))]
    pub category: Option<String>,
    pub sort_order: Option<i32>,
}

impl Record for Gallery {
    const TABLE: &'static str = "galleries";
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "image_url", "description", "category", "sort_order", "created_at", "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Gallery {
    const COLLECTION: &'static str = "galleries";
    const FILTERS: &'static [(&'static str, FilterKind)] = &[("category", FilterKind::Text)];

    type Create = CreateGallery;
    type Update = UpdateGallery;

    fn create(input: CreateGallery, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            image_url: input.image_url,
            description: input.description,
            category: input.category,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateGallery, now: DateTime<Utc>) {
        set(&mut self.title, input.title);
        set(&mut self.image_url, input.image_url);
        set_optional(&mut self.description, input.description);
        set_optional(&mut self.category, input.category);
        set(&mut self.sort_order, input.sort_order);
        self.updated_at = now;
    }

    fn default_order() -> Order {
        Order::asc("sort_order")
    }
}
