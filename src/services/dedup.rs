// src/services/dedup.rs

//! Request ID to raw content cache.
//!
//! A present, non-empty value means the exact content was already handled.
//! Each cache owns its own lock, so search and monitor traffic never contend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Concurrent `id -> raw request` map.
#[derive(Debug, Default)]
pub struct DedupCache {
    entries: Mutex<HashMap<String, String>>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // The map holds plain strings, a poisoned guard is still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Last content stored for `id`, or an empty string.
    pub fn get(&self, id: &str) -> String {
        self.lock().get(id).cloned().unwrap_or_default()
    }

    /// Whether `id` was already handled.
    pub fn contains(&self, id: &str) -> bool {
        self.lock().get(id).is_some_and(|v| !v.is_empty())
    }

    /// Store `content` for `id`; last writer wins.
    pub fn put(&self, id: impl Into<String>, content: impl Into<String>) {
        self.lock().insert(id.into(), content.into());
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Replace every entry under a single lock.
    pub fn replace_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = self.lock();
        map.clear();
        map.extend(entries);
    }

    /// Copy of all entries, sorted by ID.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_unknown_is_empty() {
        let cache = DedupCache::new();
        assert_eq!(cache.get("missing"), "");
        assert!(!cache.contains("missing"));
    }

    #[test]
    fn test_put_then_get() {
        let cache = DedupCache::new();
        cache.put("abc", "Name|Sword");
        assert_eq!(cache.get("abc"), "Name|Sword");
        assert!(cache.contains("abc"));

        cache.put("abc", "Name|Shield");
        assert_eq!(cache.get("abc"), "Name|Shield");
    }

    #[test]
    fn test_empty_value_is_not_seen() {
        let cache = DedupCache::new();
        cache.put("abc", "");
        assert!(!cache.contains("abc"));
    }

    #[test]
    fn test_clear() {
        let cache = DedupCache::new();
        cache.put("a", "1");
        cache.put("b", "2");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), "");
    }

    #[test]
    fn test_replace_all_drops_old_entries() {
        let cache = DedupCache::new();
        cache.put("old", "1");
        cache.replace_all(vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]);
        assert_eq!(
            cache.snapshot(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_concurrent_puts_are_not_lost() {
        let cache = Arc::new(DedupCache::new());
        let handles: Vec<_> = (0..16)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.put(format!("{t}-{i}"), format!("v{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1600);
        assert_eq!(cache.get("15-99"), "v99");
    }
}
