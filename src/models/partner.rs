use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, only, set, set_optional, Resource};
use crate::database::{Order, Record};

/// Airline, hotel or agency partner shown in the logo strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub logo_url: String,
    pub website_url: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartner {
    #[validate(length(min = 1, max = 120, message = "nama wajib diisi"))]
    pub name: String,
    #[validate(url(message = "URL logo tidak valid"))]
    pub logo_url: String,
    #[validate(url(message = "URL tidak valid"))]
    pub website_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePartner {
    #[validate(length(min = 1, max = 120, message = "nama wajib diisi"))]
    pub name: Option<String>,
    #[validate(url(message = "URL logo tidak valid"))]
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

impl Record for Partner {
    const TABLE: &'static str = "partners";
    const COLUMNS: &'static [&'static str] = &[
        "id", "name", "logo_url", "website_url", "sort_order", "active", "created_at", "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Partner {
    const COLLECTION: &'static str = "partners";

    type Create = CreatePartner;
    type Update = UpdatePartner;

    fn create(input: CreatePartner, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            logo_url: input.logo_url,
            website_url: input.website_url,
            sort_order: input.sort_order,
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdatePartner, now: DateTime<Utc>) {
        set(&mut self.name, input.name);
        set(&mut self.logo_url, input.logo_url);
        set_optional(&mut self.website_url, input.website_url);
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
