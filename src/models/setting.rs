use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{set, set_optional, FilterKind, Resource};
use crate::database::{Order, Record};

/// Site-wide key/value setting (WhatsApp number, office address, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: Uuid,
    pub key: SettingKey,
    pub value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lowercase key such as `contact.whatsapp` or `site_name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SettingKey(String);

impl SettingKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_setting_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 100
        && key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
}

impl TryFrom<String> for SettingKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_setting_key(&value) {
            Ok(Self(value))
        } else {
            Err(format!("kunci pengaturan tidak valid: {value:?}"))
        }
    }
}

impl From<SettingKey> for String {
    fn from(key: SettingKey) -> Self {
        key.0
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSetting {
    pub key: SettingKey,
    #[validate(length(max = 10000))]
    pub value: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSetting {
    pub key: Option<SettingKey>,
    #[validate(length(max = 10000))]
    pub value: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl Record for Setting {
    const TABLE: &'static str = "settings";
    const COLUMNS: &'static [&'static str] = &["id", "key", "value", "description", "created_at", "updated_at"];
    const UNIQUE: &'static [&'static str] = &["key"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Setting {
    const COLLECTION: &'static str = "settings";
    const FILTERS: &'static [(&'static str, FilterKind)] = &[("key", FilterKind::Text)];

    type Create = CreateSetting;
    type Update = UpdateSetting;

    fn create(input: CreateSetting, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            key: input.key,
            value: input.value,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: UpdateSetting, now: DateTime<Utc>) {
        set(&mut self.key, input.key);
        set(&mut self.value, input.value);
        set_optional(&mut self.description, input.description);
        self.updated_at = now;
    }

    fn default_order() -> Order {
        Order::asc("key")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_snake_case_with_dots() {
        assert!(is_setting_key("contact.whatsapp"));
        assert!(is_setting_key("site_name"));
        assert!(!is_setting_key("Site Name"));
        assert!(SettingKey::try_from(String::new()).is_err());
    }
}
