//! Address-derived cache key generation.

use sha2::{Digest, Sha256};

/// Compute the storage key for a source address.
///
/// The same address always maps to the same 64-character hex key, whatever
/// its length or character set.
pub fn compute_cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("https://dart.dev/language");
        let hash2 = compute_cache_key("https://dart.dev/language");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_distinct_addresses() {
        let a = compute_cache_key("https://dart.dev/docs");
        let b = compute_cache_key("https://dart.dev/docs/");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("https://example.com/a?b=c d#frag");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_bounded_for_long_addresses() {
        let long = format!("https://example.com/{}", "x".repeat(10_000));
        assert_eq!(compute_cache_key(&long).len(), 64);
    }
}
