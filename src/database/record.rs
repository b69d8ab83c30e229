use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A row the storage layer can persist.
///
/// Records travel to and from the store as JSON objects whose keys are the
/// column names in `COLUMNS`. Queries may only filter or order on those
/// columns.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Table (or collection) name. Must be a plain identifier.
    const TABLE: &'static str;

    /// All persisted columns, `id` first.
    const COLUMNS: &'static [&'static str];

    /// Columns whose values must be unique across the table
    const UNIQUE: &'static [&'static str] = &[];

    fn id(&self) -> Uuid;

    fn has_column(name: &str) -> bool {
        Self::COLUMNS.contains(&name)
    }
}
