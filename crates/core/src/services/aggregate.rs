//! Helpers for merging batch query results back onto primary rows.

use std::collections::{HashMap, HashSet};

use vidtube_db::repositories::CountMap;

/// Read a per-key count, treating absent keys as zero.
pub trait CountLookup {
    /// Count recorded for `id`, or 0.
    fn count_of(&self, id: &str) -> u64;
}

impl CountLookup for CountMap {
    fn count_of(&self, id: &str) -> u64 {
        self.get(id).copied().unwrap_or(0)
    }
}

/// Membership set built from one prefetched relation list.
#[derive(Debug, Clone, Default)]
pub struct IdSet(HashSet<String>);

impl IdSet {
    /// Whether `id` appears in the prefetched list.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }
}

impl FromIterator<String> for IdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Index rows by their ID.
pub fn index_by_id<T>(rows: Vec<T>, id: impl Fn(&T) -> &str) -> HashMap<String, T> {
    rows.into_iter()
        .map(|row| (id(&row).to_string(), row))
        .collect()
}

/// Distinct values of `key` across `rows`, in first-seen order.
pub fn distinct_keys<T>(rows: &[T], key: impl Fn(&T) -> &str) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(key)
        .filter(|k| seen.insert(*k))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_of_defaults_to_zero() {
        let mut counts = CountMap::new();
        counts.insert("v1".to_string(), 3);

        assert_eq!(counts.count_of("v1"), 3);
        assert_eq!(counts.count_of("v2"), 0);
    }

    #[test]
    fn test_id_set_contains() {
        let set: IdSet = vec!["a".to_string(), "b".to_string()].into_iter().collect();

        assert!(set.contains("a"));
        assert!(!set.contains("c"));
        assert!(!IdSet::default().contains("a"));
    }

    #[test]
    fn test_distinct_keys_keeps_first_seen_order() {
        let rows = vec![("v1", "u2"), ("v2", "u1"), ("v3", "u2")];
        let keys = distinct_keys(&rows, |r| r.1);

        assert_eq!(keys, vec!["u2".to_string(), "u1".to_string()]);
    }

    #[test]
    fn test_index_by_id() {
        let rows = vec![("v1", 1), ("v2", 2)];
        let index = index_by_id(rows, |r| r.0);

        assert_eq!(index.get("v2").map(|r| r.1), Some(2));
        assert_eq!(index.len(), 2);
    }
}
