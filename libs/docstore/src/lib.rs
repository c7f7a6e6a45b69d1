//! In-process document store.
//!
//! `Collection` is the boundary the rest of the workspace talks to; `MemoryStore`
//! is the engine behind it (Mongo-like filters, projection, sort, windowing,
//! relation population, JSON snapshots). `advanced_results` runs a planned
//! list query from `query-core` against any collection.

pub mod advanced;
pub mod collection;
pub mod error;
pub mod geo;
pub mod matcher;
pub mod memory;
pub mod path;
pub mod projection;
pub mod snapshot;
pub mod sorting;

pub use advanced::advanced_results;
pub use collection::{Collection, CollectionSpec, Relation};
pub use error::{Result, StoreError};
pub use memory::{MemCollection, MemoryStore};

pub use query_core::{Document, ID_FIELD};

/// Creation timestamp stamped on insert when missing.
pub const CREATED_AT_FIELD: &str = "createdAt";
