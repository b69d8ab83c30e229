use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Record;

/// One recorded page view. `visitor_hash` is a salted digest of the client
/// address and user agent; raw addresses are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub path: String,
    pub visitor_hash: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Visit {
    const TABLE: &'static str = "visits";
    const COLUMNS: &'static [&'static str] = &["id", "path", "visitor_hash", "user_agent", "referrer", "created_at"];

    fn id(&self) -> Uuid {
        self.id
    }
}
