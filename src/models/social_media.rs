use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, only, set, set_optional, FilterKind, Resource};
use crate::database::{Order, Record};

/// Footer/header social link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMedia {
    pub id: Uuid,
    pub platform: String,
    pub url: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSocialMedia {
    #[validate(length(min = 1, max = 50, message = "platform wajib diisi"))]
    pub platform: String,
    #[validate(url(message = "URL tidak valid"))]
    pub url: String,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSocialMedia {
    #[validate(length(min = 1, max = 50, message = "platform wajib diisi"))]
    pub platform: Option<String>,
    #[validate(url(message = "URL tidak valid"))]
    pub url: Option<String>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

impl Record for SocialMedia {
    const TABLE: &'static str = "social_media";
    const COLUMNS: &'static [&'static str] = &[
        "id", "platform", "url", "icon", "sort_order", "active", "created_at", "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for SocialMedia {
    const COLLECTION: &'static str = "social-media";
    const FILTERS: &'static [(&'static str, FilterKind)] = &[("platform", FilterKind::Text)];

    type Create = CreateSocialMedia;
    type Update = UpdateSocialMedia;

    fn create(input: CreateSocialMedia, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            platform: input.platform,
            url: input.url,
            icon: input.icon,
            sort_order: input.sort_order,
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateSocialMedia, now: DateTime<Utc>) {
        set(&mut self.platform, input.platform);
        set(&mut self.url, input.url);
        set_optional(&mut self.icon, input.icon);
        set(&mut self.sort_order, input.sort_order);
        set(&mut self.active, input.active);
        self.updated_at = now;
    }

    fn default_order() -> Order {
        Order::asc("sort_order")
    }

    fn public_filter() -> Map<String, Value> {
        only("active", true)
    }
}
