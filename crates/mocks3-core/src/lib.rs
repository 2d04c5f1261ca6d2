//! Storage side of MockS3.
//!
//! ```text
//! mocks3-http dispatcher
//!        |
//!        v
//!   dyn ObjectStore (trait)
//!        |
//!        v
//!   InMemoryObjectStore (buckets + keys, bodies in memory or spilled to disk)
//! ```

pub mod checksums;
pub mod config;
pub mod error;
pub mod store;

pub use config::MockS3Config;
pub use error::StoreError;
pub use store::memory::InMemoryObjectStore;
pub use store::{
    BucketInfo, ListResult, ObjectContent, ObjectMeta, ObjectReader, ObjectStore, StoredObject,
};
