//! Content hashing for cache keys and deterministic ids.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the JSON form of `value`, as 64 lowercase hex digits.
///
/// Struct fields serialize in declaration order and the workbook model keeps
/// sheets and columns in input order, so equal inputs give equal keys.
///
/// # Errors
/// Fails only when `value` cannot be serialized.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(digest_hex(&json))
}

/// Lowercase hex SHA256 of raw bytes.
pub fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// `<prefix>_<hex>` id over `parts`, truncated to `len` hex digits.
///
/// Parts are joined with a unit separator so `["ab", "c"]` and `["a", "bc"]`
/// hash differently. Callers sort the parts when order should not matter.
pub fn short_id<S: AsRef<str>>(prefix: &str, parts: &[S], len: usize) -> String {
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\u{1f}");
    let hex = digest_hex(joined.as_bytes());
    format!("{}_{}", prefix, &hex[..len.min(hex.len())])
}
