pub mod admin_user;
pub mod blog;
pub mod gallery;
pub mod hero_button;
pub mod partner;
pub mod product;
pub mod setting;
pub mod social_media;
pub mod testimonial;
pub mod types;
pub mod visit;

pub use admin_user::AdminUser;
pub use blog::{BlogPost, CreateBlogPost, UpdateBlogPost};
pub use gallery::{CreateGallery, Gallery, UpdateGallery};
pub use hero_button::{ButtonVariant, CreateHeroButton, HeroButton, UpdateHeroButton};
pub use partner::{CreatePartner, Partner, UpdatePartner};
pub use product::{CreateProduct, Product, UpdateProduct};
pub use setting::{CreateSetting, Setting, SettingKey, UpdateSetting};
pub use social_media::{CreateSocialMedia, SocialMedia, UpdateSocialMedia};
pub use testimonial::{CreateTestimonial, Testimonial, UpdateTestimonial};
pub use types::{Price, Slug};
pub use visit::Visit;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::database::{Order, Record};

/// JSON type of a filterable column. Query-string values are typed from
/// the column, never guessed from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Integer,
    Bool,
}

impl FilterKind {
    /// `None` when the raw value does not fit the column
    pub fn parse(self, raw: &str) -> Option<Value> {
        match self {
            FilterKind::Text => Some(Value::String(raw.to_string())),
            FilterKind::Integer => raw.parse::<i64>().ok().map(Value::from),
            FilterKind::Bool => raw.parse::<bool>().ok().map(Value::Bool),
        }
    }
}

/// A record the admin dashboard manages through the generic CRUD handlers
pub trait Resource: Record {
    /// Collection name used in URLs and operation logs, e.g. `hero-buttons`
    const COLLECTION: &'static str;

    /// Columns clients may filter on with `?column=value`, with the column's type
    const FILTERS: &'static [(&'static str, FilterKind)] = &[];

    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn create(input: Self::Create, id: Uuid, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, input: Self::Update, now: DateTime<Utc>);

    fn default_order() -> Order {
        Order::desc("created_at")
    }

    /// Filter forced onto public listings, e.g. only active rows
    fn public_filter() -> Map<String, Value> {
        Map::new()
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// Overwrite `target` when the update carries a value
pub(crate) fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Same as `set` for nullable columns; an empty string clears the column
pub(crate) fn set_optional(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *target = if value.trim().is_empty() { None } else { Some(value) };
    }
}

pub(crate) fn only(field: &str, value: bool) -> Map<String, Value> {
    let mut filter = Map::new();
    filter.insert(field.to_string(), Value::Bool(value));
    filter
}
