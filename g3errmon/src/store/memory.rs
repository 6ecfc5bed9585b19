/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Mutex;

use ahash::{AHashMap, AHashSet};

use super::{ErrorsRepository, StoredErrorAggregate};

/// Process-local repository. Stored snapshots are replaced as a whole on
/// every write; the resolved set is keyed per service.
#[derive(Default)]
pub(crate) struct MemoryErrorsRepository {
    errors: Mutex<AHashMap<String, Vec<StoredErrorAggregate>>>,
    resolved: Mutex<AHashMap<String, AHashSet<String>>>,
}

impl ErrorsRepository for MemoryErrorsRepository {
    fn store_errors(&self, service: &str, errors: Vec<StoredErrorAggregate>) {
        let mut ht = self.errors.lock().unwrap();
        ht.insert(service.to_string(), errors);
    }

    fn get_errors(&self, service: &str) -> Vec<StoredErrorAggregate> {
        let ht = self.errors.lock().unwrap();
        ht.get(service).cloned().unwrap_or_default()
    }

    fn search_resolved(&self, service: &str, aggregation_key: &str) -> bool {
        let ht = self.resolved.lock().unwrap();
        ht.get(service)
            .map(|set| set.contains(aggregation_key))
            .unwrap_or(false)
    }

    fn mark_resolved(&self, service: &str, aggregation_key: &str) {
        let mut ht = self.resolved.lock().unwrap();
        ht.entry(service.to_string())
            .or_default()
            .insert(aggregation_key.to_string());
    }

    fn remove_resolved(&self, service: &str, aggregation_key: &str) {
        let mut ht = self.resolved.lock().unwrap();
        if let Some(set) = ht.get_mut(service) {
            set.remove(aggregation_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(key: &str) -> StoredErrorAggregate {
        StoredErrorAggregate {
            aggregation_key: key.to_string(),
            severity: "error".to_string(),
            total_count: 1,
            latest_errors: Vec::new(),
        }
    }

    #[test]
    fn store_replaces() {
        let repository = MemoryErrorsRepository::default();
        repository.store_errors("web", vec![stored("k1"), stored("k2")]);
        assert_eq!(repository.get_errors("web").len(), 2);

        repository.store_errors("web", vec![stored("k3")]);
        let errors = repository.get_errors("web");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].aggregation_key, "k3");

        assert!(repository.get_errors("other").is_empty());
    }

    #[test]
    fn resolved_set() {
        let repository = MemoryErrorsRepository::default();
        assert!(!repository.search_resolved("web", "k1"));

        repository.mark_resolved("web", "k1");
        assert!(repository.search_resolved("web", "k1"));
        // per service membership
        assert!(!repository.search_resolved("other", "k1"));

        repository.remove_resolved("web", "k1");
        assert!(!repository.search_resolved("web", "k1"));

        // removal of a never resolved key is a no-op
        repository.remove_resolved("web", "k2");
        assert!(!repository.search_resolved("web", "k2"));
    }
}
