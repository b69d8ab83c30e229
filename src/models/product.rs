use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, only, set, set_optional, FilterKind, Price, Resource, Slug};
use crate::database::{Order, Record};

fn default_currency() -> String {
    "IDR".to_string()
}

/// A Hajj or Umrah package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Price,
    pub currency: String,
    pub duration_days: Option<i32>,
    pub departure_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200, message = "nama paket wajib diisi"))]
    pub name: String,
    pub slug: Slug,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3, message = "kode mata uang harus 3 huruf"))]
    pub currency: String,
    #[validate(range(min = 1, max = 90, message = "durasi 1 sampai 90 hari"))]
    pub duration_days: Option<i32>,
    pub departure_date: Option<NaiveDate>,
    #[validate(url(message = "URL gambar tidak valid"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200, message = "nama paket wajib diisi"))]
    pub name: Option<String>,
    pub slug: Option<Slug>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub price: Option<Price>,
    #[validate(length(equal = 3, message = "kode mata uang harus 3 huruf"))]
    pub currency: Option<String>,
    #[validate(range(min = 1, max = 90, message = "durasi 1 sampai 90 hari"))]
    pub duration_days: Option<i32>,
    pub departure_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}

impl Record for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id", "name", "slug", "description", "price", "currency", "duration_days", "departure_date", "image_url",
        "featured", "active", "created_at", "updated_at",
    ];
    const UNIQUE: &'static [&'static str] = &["slug"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Product {
    const COLLECTION: &'static str = "products";
    const FILTERS: &'static [(&'static str, FilterKind)] =
        &[("featured", FilterKind::Bool), ("currency", FilterKind::Text)];

    type Create = CreateProduct;
    type Update = UpdateProduct;

    fn create(input: CreateProduct, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            price: input.price,
            currency: input.currency.to_uppercase(),
            duration_days: input.duration_days,
            departure_date: input.departure_date,
            image_url: input.image_url,
            featured: input.featured,
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateProduct, now: DateTime<Utc>) {
        set(&mut self.name, input.name);
        set(&mut self.slug, input.slug);
        set_optional(&mut self.description, input.description);
        set(&mut self.price, input.price);
        set(&mut self.currency, input.currency.map(|c| c.to_uppercase()));
        if input.duration_days.is_some() {
            self.duration_days = input.duration_days;
        }
        if input.departure_date.is_some() {
            self.departure_date = input.departure_date;
        }
        set_optional(&mut self.image_url, input.image_url);
        set(&mut self.featured, input.featured);
        set(&mut self.active, input.active);
        self.updated_at = now;
    }

    fn default_order() -> Order {
        Order::asc("departure_date")
    }

    fn public_filter() -> Map<String, Value> {
        only("active", true)
    }
}
