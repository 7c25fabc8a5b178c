//! In-memory backend for local runs and tests.
//!
//! Behaves like the production pair of collaborators from the pipeline's
//! point of view: fetches come back base64-encoded, puts take plain JSON,
//! and `search_objects` understands the `field:'value'` filter shape. Every
//! call is recorded so tests can assert on collaborator traffic.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::client::{EventSearch, ObjectStore};
use crate::codec;
use crate::error::{SearchError, StoreError};
use crate::types::{
    EventSearchRequest, EventSearchResponse, FetchObjectRequest, FetchObjectResponse,
    PutObjectRequest, SearchObjectsRequest, SearchObjectsResponse,
};
use crate::Document;

/// One observed collaborator call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Fetch { collection: String, key: String },
    Put { collection: String, key: String },
    SearchObjects { collection: String, filter: String },
    SearchEvents { search_name: String },
}

#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    events_by_execution: RwLock<HashMap<String, Vec<Document>>>,
    job_url: RwLock<String>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing the codec and the call log.
    pub async fn insert_document(&self, collection: &str, key: &str, doc: Document) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
    }

    /// Read a stored document back, bypassing the codec and the call log.
    pub async fn document(&self, collection: &str, key: &str) -> Option<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned()
    }

    /// Seed telemetry events returned for one execution id.
    pub async fn push_events(&self, execution_id: &str, events: Vec<Document>) {
        self.events_by_execution
            .write()
            .await
            .entry(execution_id.to_string())
            .or_default()
            .extend(events);
    }

    /// Set the backend UI link reported alongside event results.
    pub async fn set_job_url(&self, url: &str) {
        *self.job_url.write().await = url.to_string();
    }

    /// Every collaborator call observed so far, in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.write().await.push(call);
    }
}

/// Split a `field:'value'` filter into its parts.
fn parse_filter(filter: &str) -> Option<(&str, &str)> {
    let (field, raw) = filter.split_once(':')?;
    let value = raw.trim().strip_prefix('\'')?.strip_suffix('\'')?;
    Some((field.trim(), value))
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn fetch_object(
        &self,
        req: FetchObjectRequest,
    ) -> Result<FetchObjectResponse, StoreError> {
        self.record(RecordedCall::Fetch {
            collection: req.collection.clone(),
            key: req.object_key.clone(),
        })
        .await;

        let collections = self.collections.read().await;
        let doc = collections
            .get(&req.collection)
            .and_then(|c| c.get(&req.object_key))
            .ok_or(StoreError::NotFound)?;
        let data = codec::encode_fetch_payload(doc)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(FetchObjectResponse { data })
    }

    async fn put_object(&self, req: PutObjectRequest) -> Result<(), StoreError> {
        self.record(RecordedCall::Put {
            collection: req.collection.clone(),
            key: req.object_key.clone(),
        })
        .await;

        let doc: Document = serde_json::from_slice(&req.data)
            .map_err(|e| StoreError::Backend(format!("put payload is not a JSON document: {e}")))?;
        self.collections
            .write()
            .await
            .entry(req.collection)
            .or_default()
            .insert(req.object_key, doc);
        Ok(())
    }

    async fn search_objects(
        &self,
        req: SearchObjectsRequest,
    ) -> Result<SearchObjectsResponse, StoreError> {
        self.record(RecordedCall::SearchObjects {
            collection: req.collection.clone(),
            filter: req.filter.clone(),
        })
        .await;

        let Some((field, value)) = parse_filter(&req.filter) else {
            return Err(StoreError::Backend(format!(
                "unsupported filter expression: {}",
                req.filter
            )));
        };

        let collections = self.collections.read().await;
        let object_keys = collections
            .get(&req.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field).and_then(Value::as_str) == Some(value))
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(SearchObjectsResponse { object_keys })
    }
}

#[async_trait]
impl EventSearch for MemoryBackend {
    async fn search_events(
        &self,
        req: EventSearchRequest,
    ) -> Result<EventSearchResponse, SearchError> {
        self.record(RecordedCall::SearchEvents {
            search_name: req.search_name.clone(),
        })
        .await;

        let execution_id = req
            .search_params
            .get("execution_id")
            .ok_or_else(|| SearchError("missing execution_id parameter".to_string()))?;
        let events = self
            .events_by_execution
            .read()
            .await
            .get(execution_id)
            .cloned()
            .unwrap_or_default();
        Ok(EventSearchResponse {
            events,
            job_url: self.job_url.read().await.clone(),
        })
    }
}
