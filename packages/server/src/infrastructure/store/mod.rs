//! KeyValueStore の実装
//!
//! - `inmemory`: ネストした BTreeMap を使った実装

pub mod inmemory;

pub use inmemory::InMemoryStore;
