use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, only, set, set_optional, FilterKind, Resource};
use crate::database::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: Uuid,
    pub name: String,
    pub role: Option<String>,
    pub message: String,
    pub rating: i32,
    pub avatar_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestimonial {
    #[validate(length(min = 1, max = 120, message = "nama wajib diisi"))]
    pub name: String,
    #[validate(length(max = 120))]
    pub role: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "pesan wajib diisi"))]
    pub message: String,
    #[validate(range(min = 1, max = 5, message = "rating harus 1 sampai 5"))]
    pub rating: i32,
    #[validate(url(message = "URL tidak valid"))]
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTestimonial {
    #[validate(length(min = 1, max = 120, message = "nama wajib diisi"))]
    pub name: Option<String>,
    #[validate(length(max = 120))]
    pub role: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "pesan wajib diisi"))]
    pub message: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating harus 1 sampai 5"))]
    pub rating: Option<i32>,
    pub avatar_url: Option<String>,
    pub published: Option<bool>,
}

impl Record for Testimonial {
    const TABLE: &'static str = "testimonials";
    const COLUMNS: &'static [&'static str] = &[
        "id", "name", "role", "message", "rating", "avatar_url", "published", "created_at", "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Testimonial {
    const COLLECTION: &'static str = "testimonials";
    const FILTERS: &'static [(&'static str, FilterKind)] = &[("rating", FilterKind::Integer)];

    type Create = CreateTestimonial;
    type Update = UpdateTestimonial;

    fn create(input: CreateTestimonial, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            role: input.role,
            message: input.message,
            rating: input.rating,
            avatar_url: input.avatar_url,
            published: input.published,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateTestimonial, now: DateTime<Utc>) {
        set(&mut self.name, input.name);
        set_optional(&mut self.role, input.role);
        set(&mut self.message, input.message);
        set(&mut self.rating, input.rating);
        set_optional(&mut self.avatar_url, input.avatar_url);
        set(&mut self.published, input.published);
        self.updated_at = now;
    }

    fn public_filter() -> Map<String, Value> {
        only("published", true)
    }
}
