//! Stored-document codec.
//!
//! The object store's fetch side returns documents as base64-encoded JSON,
//! while puts take plain JSON bytes. This asymmetry is the backend's
//! contract, so the codec lives here at the boundary and nothing above it
//! ever sees base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::DocumentError;
use crate::Document;

/// Decode a fetched payload: base64, then a JSON object.
pub fn decode_document(data: &[u8]) -> Result<Document, DocumentError> {
    let json = STANDARD.decode(data)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Encode a document the way the fetch side returns it. The in-memory
/// backend uses this to mirror the production contract.
pub fn encode_fetch_payload(doc: &Document) -> Result<Vec<u8>, DocumentError> {
    let json = serde_json::to_vec(doc)?;
    Ok(STANDARD.encode(json).into_bytes())
}
