//! GQLZ Connection - Gateway connection stores
//!
//! This crate owns gateway credentials, tracks connection health, persists
//! connection profiles and runs GraphQL and SQL queries against the active
//! connection.

mod client;
mod config;
mod debounce;
mod executor;
pub mod health;
mod manager;
mod settings;
mod single;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use client::HttpTransport;
pub use config::{ConnectionRecord, ConnectionTarget};
pub use debounce::DebouncedTester;
pub use executor::QueryExecutor;
pub use health::{ConnectionState, ProbeReport};
pub use manager::{ConnectionManager, ProfilesSnapshot};
pub use settings::{StoreSettings, config_dir, connections_file, data_dir, settings_file};
pub use single::SingleConnectionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistenceBridge};
