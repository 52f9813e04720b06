use md5::{Digest, Md5};

use crate::{ModelError, ModelResult};

/// Length of a hex-encoded MD5 digest.
pub(crate) const NAME_HASH_LEN: usize = 32;

/// MD5 of names of platform-managed groups that must never be reclaimed.
///
/// Stored hashed so the literal names are not embedded in the binary.
pub(crate) const BUILTIN_DENIED_HASHES: &[&str] = &[
    "7e8e0b947214e31d9f02a94090487c0d",
    "cdb5195b6e59c8d4743d60fe5d1ddd54",
    "f054bc18556dfd9d4cd5c6f92a3b96db",
    "e35386fdf3abd880dd3b57c7bcb2340f",
    "62e5e9c30b987e3d11dbeb7a1b07ff70",
    "6e0030125d834f2263ff441f6b8d3ff7",
];

/// Lowercase hex MD5 of a resource name.
///
/// Used as an opaque lookup key for the denylist, not as a security measure.
///
/// # Examples
/// ```
/// use reclaim_model::name_hash;
///
/// assert_eq!(name_hash("abc"), "900150983cd24fb0d6963f7d28e17f72");
/// ```
pub fn name_hash(name: &str) -> String {
    hex::encode(Md5::digest(name.as_bytes()))
}

/// Validate and normalise a configured hash.
pub(crate) fn normalize_hash(hash: &str) -> ModelResult<String> {
    let h = hash.trim().to_ascii_lowercase();
    if h.len() != NAME_HASH_LEN || !h.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ModelError::InvalidHash(hash.to_string()));
    }
    Ok(h)
}
