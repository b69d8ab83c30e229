use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, only, set, Resource};
use crate::database::{Order, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Outline,
}

/// Call-to-action button on the landing page hero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroButton {
    pub id: Uuid,
    pub label: String,
    /// Absolute URL or site-relative path
    pub url: String,
    pub variant: ButtonVariant,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHeroButton {
    #[validate(length(min = 1, max = 60, message = "label wajib diisi"))]
    pub label: String,
    #[validate(length(min = 1, max = 500, message = "tautan wajib diisi"))]
    pub url: String,
    #[serde(default)]
    pub variant: ButtonVariant,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHeroButton {
    #[validate(length(min = 1, max = 60, message = "label wajib diisi"))]
    pub label: Option<String>,
    #[validate(length(min = 1, max = 500, message = "tautan wajib diisi"))]
    pub url: Option<String>,
    pub variant: Option<ButtonVariant>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

impl Record for HeroButton {
    const TABLE: &'static str = "hero_buttons";
    const COLUMNS: &'static [&'static str] = &[
        "id", "label", "url", "variant", "sort_order", "active", "created_at", "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for HeroButton {
    const COLLECTION: &'static str = "hero-buttons";

    type Create = CreateHeroButton;
    type Update = UpdateHeroButton;

    fn create(input: CreateHeroButton, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            label: input.label,
            url: input.url,
            variant: input.variant,
            sort_order: input.sort_order,
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateHeroButton, now: DateTime<Utc>) {
        set(&mut self.label, input.label);
        set(&mut self.url, input.url);
        set(&mut self.variant, input.variant);
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_variant_is_rejected() {
        let parsed = serde_json::from_value::<CreateHeroButton>(json!({
            "label": "Daftar",
            "url": "/paket",
            "variant": "blinking"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn variant_defaults_to_primary() {
        let input: CreateHeroButton = serde_json::from_value(json!({"label": "Daftar", "url": "/paket"})).unwrap();
        assert_eq!(input.variant, ButtonVariant::Primary);
        assert!(input.active);
    }
}
