pub mod json_store;
pub mod kv_store;

pub use kv_store::{FileStore, KeyValueStore, MemoryStore, store_dir};
