/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The JSON document served by one instance at the error report endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct InstanceReport {
    #[serde(default)]
    pub(crate) error_aggregate: Vec<ErrorAggregate>,
}

/// One error signature as reported by an instance. `total_count` is the
/// instance-local cumulative value, reconciled against per-target counters
/// by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ErrorAggregate {
    pub(crate) aggregation_key: String,
    #[serde(default)]
    pub(crate) total_count: u64,
    #[serde(default)]
    pub(crate) severity: String,
    #[serde(default)]
    pub(crate) latest_errors: Vec<ErrorWithContext>,
}

/// One concrete observed occurrence of an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ErrorWithContext {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub(crate) timestamp: DateTime<Utc>,
    #[serde(default)]
    pub(crate) severity: String,
    #[serde(default)]
    pub(crate) uuid: String,
    pub(crate) error: ErrorInstance,
    #[serde(default)]
    pub(crate) http_context: Option<HttpContext>,
}

/// An error with its cause chain. Each node owns its cause, so the chain is
/// acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ErrorInstance {
    #[serde(default)]
    pub(crate) class: String,
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) stacktrace: Vec<String>,
    #[serde(default)]
    pub(crate) cause: Option<Box<ErrorInstance>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct HttpContext {
    #[serde(default)]
    pub(crate) request_method: String,
    #[serde(default)]
    pub(crate) request_url: String,
    #[serde(default)]
    pub(crate) request_headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub(crate) request_body: Option<String>,
}

/// One instance's report for one scrape cycle, tagged with the scraped target.
#[derive(Debug, Clone)]
pub(crate) struct ResponsePayload {
    pub(crate) target: String,
    pub(crate) error_aggregate: Vec<ErrorAggregate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_full_report() {
        let body = r#"
            {
              "error_aggregate": [
                {
                  "aggregation_key": "java.net.SocketTimeoutException@abc123",
                  "total_count": 12,
                  "severity": "warning",
                  "latest_errors": [
                    {
                      "timestamp": 1700000000,
                      "severity": "warning",
                      "uuid": "instance-1",
                      "error": {
                        "class": "java.net.SocketTimeoutException",
                        "message": "connect timed out",
                        "stacktrace": ["a.java:1", "b.java:2"],
                        "cause": {
                          "class": "java.io.IOException",
                          "message": "broken pipe"
                        }
                      },
                      "http_context": {
                        "request_method": "GET",
                        "request_url": "https://example.net/search",
                        "request_headers": {"Accept": "text/html"}
                      }
                    }
                  ]
                }
              ]
            }
        "#;
        let report: InstanceReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.error_aggregate.len(), 1);

        let item = &report.error_aggregate[0];
        assert_eq!(item.aggregation_key, "java.net.SocketTimeoutException@abc123");
        assert_eq!(item.total_count, 12);
        assert_eq!(item.severity, "warning");

        let occurrence = &item.latest_errors[0];
        assert_eq!(occurrence.timestamp.timestamp(), 1700000000);
        assert_eq!(occurrence.uuid, "instance-1");
        assert_eq!(occurrence.error.stacktrace.len(), 2);

        let cause = occurrence.error.cause.as_ref().unwrap();
        assert_eq!(cause.class, "java.io.IOException");
        assert!(cause.cause.is_none());

        let http_context = occurrence.http_context.as_ref().unwrap();
        assert_eq!(http_context.request_method, "GET");
        assert_eq!(
            http_context.request_headers.as_ref().unwrap()["Accept"],
            "text/html"
        );
        assert!(http_context.request_body.is_none());
    }

    #[test]
    fn decode_defaults() {
        let body = r#"
            {
              "error_aggregate": [
                {
                  "aggregation_key": "k1",
                  "latest_errors": [
                    {"timestamp": 1700000001, "error": {"class": "E"}}
                  ]
                }
              ]
            }
        "#;
        let report: InstanceReport = serde_json::from_str(body).unwrap();
        let item = &report.error_aggregate[0];
        assert_eq!(item.total_count, 0);
        assert_eq!(item.severity, "");
        let occurrence = &item.latest_errors[0];
        assert_eq!(occurrence.severity, "");
        assert_eq!(occurrence.uuid, "");
        assert!(occurrence.http_context.is_none());
    }

    #[test]
    fn decode_empty_report() {
        let report: InstanceReport = serde_json::from_str("{}").unwrap();
        assert!(report.error_aggregate.is_empty());
    }
}
