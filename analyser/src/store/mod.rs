//! Per-flight result persistence.

pub mod json_dir;
pub mod memory;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;

use glidecore::interface::GlideRecord;

/// Keyed storage of per-flight glide records, shared across workers.
pub trait ResultStore: Send + Sync {
    fn put(&self, flight_id: &str, record: &GlideRecord) -> anyhow::Result<()>;
    fn get(&self, flight_id: &str) -> anyhow::Result<Option<GlideRecord>>;
    fn flight_ids(&self) -> anyhow::Result<Vec<String>>;
}
