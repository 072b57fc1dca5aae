// Cache module for the persisted fetch record.
// Stores last-known statistics and the timestamps that gate refetching.

pub mod policy;
pub mod store;

pub use policy::{Category, RefreshPolicy, epoch_secs};
pub use store::{CacheRecord, load, read_record, write_bytes, write_record, write_text};
