//! Collaborator boundary: object storage and event search.
//!
//! The pipeline talks to two external systems, a keyed object store holding
//! job and execution documents, and a search backend answering object-key
//! lookups and telemetry queries. Both are consumed through traits here;
//! production deployments supply wire clients, while [`MemoryBackend`]
//! serves local runs and tests.

pub mod client;
pub mod codec;
pub mod error;
pub mod memory;
pub mod types;

pub use client::{EventSearch, ObjectStore};
pub use error::{DocumentError, SearchError, StoreError};
pub use memory::{MemoryBackend, RecordedCall};
pub use types::{
    EventSearchRequest, EventSearchResponse, FetchObjectRequest, FetchObjectResponse,
    PutObjectRequest, SearchObjectsRequest, SearchObjectsResponse,
};

/// A stored document in its generic form.
pub type Document = serde_json::Map<String, serde_json::Value>;
