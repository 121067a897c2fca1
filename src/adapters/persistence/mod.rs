//! Report persistence: SQLite (default), in-memory, and the legacy JSON import format.

pub mod legacy_json;
pub mod memory_store;
pub mod sqlite_repo;

pub use memory_store::MemoryReportStore;
pub use sqlite_repo::SqliteRepo;
