//! Collaborator traits consumed by the upsert pipeline.

use async_trait::async_trait;

use crate::error::{SearchError, StoreError};
use crate::types::{
    EventSearchRequest, EventSearchResponse, FetchObjectRequest, FetchObjectResponse,
    PutObjectRequest, SearchObjectsRequest, SearchObjectsResponse,
};

/// Keyed object storage with a filter-based key search.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one object. Absence is `Err(StoreError::NotFound)`.
    async fn fetch_object(
        &self,
        req: FetchObjectRequest,
    ) -> Result<FetchObjectResponse, StoreError>;

    /// Write one object, replacing any existing value under the key.
    async fn put_object(&self, req: PutObjectRequest) -> Result<(), StoreError>;

    /// Find object keys matching a `field:'value'` filter.
    async fn search_objects(
        &self,
        req: SearchObjectsRequest,
    ) -> Result<SearchObjectsResponse, StoreError>;
}

/// Saved-query search over workflow telemetry events.
#[async_trait]
pub trait EventSearch: Send + Sync {
    async fn search_events(
        &self,
        req: EventSearchRequest,
    ) -> Result<EventSearchResponse, SearchError>;
}
