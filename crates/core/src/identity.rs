//! Stable job identifiers.
//!
//! A job's id is a pure function of its name: the 128-bit murmur3 (x64
//! variant, seed 0) digest of the UTF-8 bytes, rendered as 32 lowercase hex
//! characters. The notification path and the job-management path derive the
//! same id independently, so neither ever has to look the other's up.

use std::io::Cursor;

/// Derive the stable identifier for a job name.
///
/// The hasher reads from an in-memory cursor, so the `io::Error` branch is
/// unreachable in practice; it is propagated anyway so callers stay in
/// `Result` land.
pub fn job_id_for_name(name: &str) -> std::io::Result<String> {
    let digest = murmur3::murmur3_x64_128(&mut Cursor::new(name.as_bytes()), 0)?;
    Ok(format!("{digest:032x}"))
}
