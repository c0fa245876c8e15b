//! Document-store access layer: client contract, staged-mutation
//! repository, query facade, and the in-memory reference client.

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod query;
pub mod repository;
pub mod tracing;

pub use client::DocumentClient;
pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryDocumentClient;
pub use query::Query;
pub use repository::Repository;
