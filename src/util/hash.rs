//! Content fingerprints for generated files.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `s`.
pub fn sha256_str(s: &str) -> String {
    hex::encode(Sha256::digest(s.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_str() {
        assert_eq!(
            sha256_str("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_ne!(sha256_str("<project/>"), sha256_str("<project />"));
    }
}
