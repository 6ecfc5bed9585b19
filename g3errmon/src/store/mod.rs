/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{ErrorAggregate, ErrorInstance, ErrorWithContext, HttpContext};

mod memory;
pub(crate) use memory::MemoryErrorsRepository;

pub(crate) const DEFAULT_SEVERITY: &str = "error";

/// The storage/resolved-set collaborator. The scrape path only ever calls
/// `store_errors`, `search_resolved` and `remove_resolved`; `mark_resolved`
/// is the operator-facing hook and `get_errors` the read side.
pub(crate) trait ErrorsRepository: Send + Sync {
    fn store_errors(&self, service: &str, errors: Vec<StoredErrorAggregate>);
    fn get_errors(&self, service: &str) -> Vec<StoredErrorAggregate>;
    fn search_resolved(&self, service: &str, aggregation_key: &str) -> bool;
    fn mark_resolved(&self, service: &str, aggregation_key: &str);
    fn remove_resolved(&self, service: &str, aggregation_key: &str);
}

pub(crate) type ArcErrorsRepository = Arc<dyn ErrorsRepository>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredErrorAggregate {
    pub(crate) aggregation_key: String,
    pub(crate) severity: String,
    pub(crate) total_count: u64,
    pub(crate) latest_errors: Vec<StoredErrorWithContext>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredErrorWithContext {
    pub(crate) timestamp: i64,
    pub(crate) severity: String,
    pub(crate) uuid: String,
    pub(crate) error: StoredErrorInstance,
    pub(crate) http_context: Option<StoredHttpContext>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredErrorInstance {
    pub(crate) class: String,
    pub(crate) message: String,
    pub(crate) stacktrace: Vec<String>,
    pub(crate) cause: Option<Box<StoredErrorInstance>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredHttpContext {
    pub(crate) request_method: String,
    pub(crate) request_url: String,
    pub(crate) request_headers: Option<HashMap<String, String>>,
    pub(crate) request_body: Option<String>,
}

/// Write the externally visible snapshot for a service: every aggregate whose
/// key is not currently marked resolved, translated to the storage shapes,
/// replacing the previously stored list as a whole. Resolved keys are only
/// omitted, never dropped from the aggregate map, so a recurrence reinstates
/// them in a later cycle's write.
pub(crate) fn store<'a, I>(service: &str, repository: &dyn ErrorsRepository, aggregates: I)
where
    I: Iterator<Item = &'a ErrorAggregate>,
{
    let mut errors = Vec::new();
    for value in aggregates {
        if !repository.search_resolved(service, &value.aggregation_key) {
            errors.push(translate_aggregate(value));
        }
    }
    repository.store_errors(service, errors);
}

pub(crate) fn severity_with_fallback(severity: &str) -> String {
    if severity.is_empty() {
        DEFAULT_SEVERITY.to_string()
    } else {
        severity.to_string()
    }
}

fn translate_aggregate(value: &ErrorAggregate) -> StoredErrorAggregate {
    StoredErrorAggregate {
        aggregation_key: value.aggregation_key.clone(),
        severity: severity_with_fallback(&value.severity),
        total_count: value.total_count,
        latest_errors: value.latest_errors.iter().map(translate_occurrence).collect(),
    }
}

fn translate_occurrence(occurrence: &ErrorWithContext) -> StoredErrorWithContext {
    StoredErrorWithContext {
        timestamp: occurrence.timestamp.timestamp(),
        severity: severity_with_fallback(&occurrence.severity),
        uuid: occurrence.uuid.clone(),
        error: StoredErrorInstance {
            class: occurrence.error.class.clone(),
            message: occurrence.error.message.clone(),
            stacktrace: occurrence.error.stacktrace.clone(),
            cause: translate_cause(&occurrence.error),
        },
        http_context: occurrence.http_context.as_ref().map(translate_http_context),
    }
}

fn translate_cause(error: &ErrorInstance) -> Option<Box<StoredErrorInstance>> {
    let cause = error.cause.as_deref()?;
    Some(Box::new(StoredErrorInstance {
        class: cause.class.clone(),
        message: cause.message.clone(),
        stacktrace: cause.stacktrace.clone(),
        cause: translate_cause(cause),
    }))
}

fn translate_http_context(http_context: &HttpContext) -> StoredHttpContext {
    StoredHttpContext {
        request_method: http_context.request_method.clone(),
        request_url: http_context.request_url.clone(),
        request_headers: http_context.request_headers.clone(),
        request_body: http_context.request_body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn instance(class: &str, cause: Option<ErrorInstance>) -> ErrorInstance {
        ErrorInstance {
            class: class.to_string(),
            message: format!("{class} raised"),
            stacktrace: vec!["frame0".to_string()],
            cause: cause.map(Box::new),
        }
    }

    fn aggregate(key: &str, severity: &str) -> ErrorAggregate {
        ErrorAggregate {
            aggregation_key: key.to_string(),
            total_count: 3,
            severity: severity.to_string(),
            latest_errors: vec![ErrorWithContext {
                timestamp: DateTime::from_timestamp(1700000000, 0).unwrap(),
                severity: severity.to_string(),
                uuid: "instance-1".to_string(),
                error: instance("Outer", Some(instance("Middle", Some(instance("Root", None))))),
                http_context: Some(HttpContext {
                    request_method: "POST".to_string(),
                    request_url: "/submit".to_string(),
                    request_headers: None,
                    request_body: Some("{}".to_string()),
                }),
            }],
        }
    }

    #[test]
    fn translate_with_fallback() {
        let stored = translate_aggregate(&aggregate("k1", ""));
        assert_eq!(stored.severity, DEFAULT_SEVERITY);
        assert_eq!(stored.total_count, 3);

        let occurrence = &stored.latest_errors[0];
        assert_eq!(occurrence.timestamp, 1700000000);
        assert_eq!(occurrence.severity, DEFAULT_SEVERITY);
        assert_eq!(occurrence.uuid, "instance-1");
        assert_eq!(
            occurrence.http_context.as_ref().unwrap().request_method,
            "POST"
        );
    }

    #[test]
    fn translate_keeps_severity() {
        let stored = translate_aggregate(&aggregate("k1", "warning"));
        assert_eq!(stored.severity, "warning");
        assert_eq!(stored.latest_errors[0].severity, "warning");
    }

    #[test]
    fn translate_cause_chain() {
        let stored = translate_aggregate(&aggregate("k1", "error"));
        let error = &stored.latest_errors[0].error;
        assert_eq!(error.class, "Outer");

        let middle = error.cause.as_ref().unwrap();
        assert_eq!(middle.class, "Middle");

        let root = middle.cause.as_ref().unwrap();
        assert_eq!(root.class, "Root");
        assert!(root.cause.is_none());
    }

    #[test]
    fn store_filters_resolved() {
        let repository = MemoryErrorsRepository::default();
        let a1 = aggregate("k1", "error");
        let a2 = aggregate("k2", "error");
        let aggregates = vec![a1, a2];

        repository.mark_resolved("web", "k1");
        store("web", &repository, aggregates.iter());
        let stored = repository.get_errors("web");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].aggregation_key, "k2");

        // once the key is removed from the resolved set it shows up again
        repository.remove_resolved("web", "k1");
        store("web", &repository, aggregates.iter());
        let mut keys: Vec<_> = repository
            .get_errors("web")
            .into_iter()
            .map(|a| a.aggregation_key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["k1".to_string(), "k2".to_string()]);
    }
}
