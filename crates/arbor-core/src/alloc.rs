//! Optimized collection types for Arbor.
//!
//! Widget ids are small integers, so the default SipHash is wasted work on
//! every arena lookup. Everything keyed by id goes through these aliases.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert("key", "value");
        assert_eq!(map.get("key"), Some(&"value"));
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        set.insert(42);
        assert!(set.contains(&42));
    }

    #[test]
    fn test_random_state_builds_indexable_maps() {
        let map: std::collections::HashMap<u64, u64, RandomState> =
            std::collections::HashMap::with_hasher(RandomState::new());
        assert!(map.is_empty());
    }
}
