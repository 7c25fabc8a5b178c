//! Boot-time seeding of the in-memory backend.
//!
//! Local deployments point `SEED_FILE` at a JSON file shaped as
//! `{collection: {key: document}}`; every document is inserted before the
//! server starts accepting requests. Production deployments supply their
//! own `ObjectStore`/`EventSearch` implementations and skip this entirely.

use std::collections::HashMap;

use jobtrail_store::{Document, MemoryBackend};
use thiserror::Error;

/// Failure while reading or parsing a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("could not read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load every document from the seed file at `path` into `backend`.
///
/// Returns the number of documents inserted.
pub async fn load_seed_file(backend: &MemoryBackend, path: &str) -> Result<usize, SeedError> {
    let raw = std::fs::read(path).map_err(|source| SeedError::Io {
        path: path.to_string(),
        source,
    })?;

    let collections: HashMap<String, HashMap<String, Document>> = serde_json::from_slice(&raw)
        .map_err(|source| SeedError::Json {
            path: path.to_string(),
            source,
        })?;

    let mut inserted = 0;
    for (collection, documents) in collections {
        for (key, document) in documents {
            backend.insert_document(&collection, &key, document).await;
            inserted += 1;
        }
    }
    Ok(inserted)
}
