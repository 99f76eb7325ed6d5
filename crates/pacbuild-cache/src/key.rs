//! Cache key derivation.
//!
//! The key is a digest over the recipe body bytes followed by the recipe's
//! `sources` list, sorted lexicographically so the key is invariant under
//! permutation of that list.

use sha2::{Digest, Sha256};

/// Compute the 64-character lowercase hex cache key for a recipe body and
/// its source list.
pub fn compute_key(recipe_body: &str, sources: &[String]) -> String {
    let mut sorted_sources: Vec<&str> = sources.iter().map(|s| s.as_str()).collect();
    sorted_sources.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(recipe_body.as_bytes());
    for source in sorted_sources {
        hasher.update(source.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_invariant_under_source_permutation() {
        let body = "name=hello\nversion=1.0.0\n";
        let a = compute_key(body, &["b.c".to_string(), "a.c".to_string()]);
        let b = compute_key(body, &["a.c".to_string(), "b.c".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn key_changes_with_recipe_body() {
        let a = compute_key("name=hello\n", &["a.c".to_string()]);
        let b = compute_key("name=goodbye\n", &["a.c".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_64_lowercase_hex_characters() {
        let key = compute_key("name=hello\n", &["a.c".to_string()]);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
