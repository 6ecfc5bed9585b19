/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::TAG_KEY_SERVICE;
use crate::processor::ProcessorStats;
use crate::scrape::Observation;
use crate::statsd::StatsdClient;
use crate::store::severity_with_fallback;
use crate::types::NodeName;

pub(super) fn emit_processor_stats(
    client: &mut StatsdClient,
    service: &NodeName,
    s: &ProcessorStats,
) {
    macro_rules! emit_count {
        ($take:ident, $name:literal) => {
            let v = s.$take();
            client
                .count(concat!("fetch.", $name), v)
                .with_tag(TAG_KEY_SERVICE, service.as_str())
                .send();
        };
    }

    emit_count!(take_fetch_total, "request_total");
    emit_count!(take_fetch_ok, "request_ok");
    emit_count!(take_fetch_timeout, "request_timeout");
    emit_count!(take_fetch_fail, "request_fail");
}

/// Per-service scrape metrics, emitted from the owning scrape task.
pub(crate) struct ScrapeMetrics {
    client: StatsdClient,
}

impl ScrapeMetrics {
    pub(crate) fn new(client: StatsdClient, service: &NodeName) -> Self {
        ScrapeMetrics {
            client: client.with_tag(TAG_KEY_SERVICE, service.as_str()),
        }
    }

    pub(crate) fn add_error_occurrences(&mut self, observation: &Observation) {
        self.client
            .count("error.occurrences", observation.delta)
            .with_tag("severity", severity_with_fallback(&observation.severity))
            .with_tag("target", &observation.target)
            .with_tag("aggregation_key", &observation.aggregation_key)
            .send();
    }

    pub(crate) fn set_instances_scraped(&mut self, n: usize) {
        self.client.gauge("scrape.instances", n as u64).send();
    }

    pub(crate) fn add_errors_scraped(&mut self, n: usize) {
        self.client.count("scrape.errors", n as u64).send();
    }

    pub(crate) fn flush(&mut self) {
        self.client.flush_sink();
    }
}
