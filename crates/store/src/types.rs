//! Request/response shapes for the storage and search traits.

use std::collections::HashMap;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchObjectRequest {
    pub collection: String,
    pub object_key: String,
}

/// Raw fetched payload. Production backends return the document as
/// base64-encoded JSON; decode with [`crate::codec::decode_document`].
#[derive(Debug, Clone, Default)]
pub struct FetchObjectResponse {
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub collection: String,
    pub object_key: String,
    /// Plain JSON bytes; puts are not base64-wrapped.
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchObjectsRequest {
    pub collection: String,
    /// `field:'value'` filter expression.
    pub filter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchObjectsResponse {
    pub object_keys: Vec<String>,
}

/// A saved-query invocation against the event-search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSearchRequest {
    pub search_name: String,
    pub search_params: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventSearchResponse {
    pub events: Vec<serde_json::Map<String, Value>>,
    /// Backend UI link to the query results for this execution.
    pub job_url: String,
}
