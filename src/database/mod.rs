pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::{connect, PgStore};
pub use record::Record;
pub use store::{Direction, ListQuery, Order, RecordStore, StoreError};
