/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use ahash::AHashMap;

use crate::types::{ErrorAggregate, ErrorWithContext, ResponsePayload};

/// Per-cycle map of aggregation key to the samples merged so far this cycle.
/// Created fresh for every cycle and discarded with it.
pub(super) type CycleAccumulator = AHashMap<String, Vec<ErrorWithContext>>;

/// One net-new occurrence count produced while folding a payload, to be
/// emitted to the metrics sink and to reopen the key in the resolved set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Observation {
    pub(crate) aggregation_key: String,
    pub(crate) severity: String,
    pub(crate) target: String,
    pub(crate) delta: u64,
}

/// The per-service aggregation state: the running aggregate map and the
/// per-target counter table. Both live for the whole orchestrator lifetime;
/// counters of targets that left the address set stay behind as inert
/// entries.
pub(super) struct ErrorAggregator {
    aggregates: AHashMap<String, ErrorAggregate>,
    target_counters: AHashMap<String, AHashMap<String, u64>>,
    max_latest_errors: Option<usize>,
}

impl ErrorAggregator {
    pub(super) fn new(max_latest_errors: Option<usize>) -> Self {
        ErrorAggregator {
            aggregates: AHashMap::new(),
            target_counters: AHashMap::new(),
            max_latest_errors,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &ErrorAggregate> {
        self.aggregates.values()
    }

    /// Fold one instance payload into the running state.
    ///
    /// For a key seen before, the contribution is the difference between the
    /// instance-local total and the last total recorded for this target, so
    /// repeated reports of the same counter never double count. A total
    /// below the recorded one means the instance restarted; the report is
    /// then taken as a fresh baseline. The first report of a key from any
    /// target is its baseline as-is.
    pub(super) fn combine(
        &mut self,
        payload: ResponsePayload,
        accumulator: &mut CycleAccumulator,
    ) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(payload.error_aggregate.len());
        let counters = self.target_counters.entry(payload.target.clone()).or_default();

        for item in payload.error_aggregate {
            let ErrorAggregate {
                aggregation_key,
                total_count,
                severity,
                latest_errors,
            } = item;

            let delta = if let Some(existing) = self.aggregates.get_mut(&aggregation_key) {
                let prev_count = counters.get(&aggregation_key).copied().unwrap_or(0);
                let delta = if total_count < prev_count {
                    total_count
                } else {
                    total_count - prev_count
                };

                let prev_samples = accumulator.remove(&aggregation_key).unwrap_or_default();
                let merged =
                    combine_latest_errors(prev_samples, latest_errors, self.max_latest_errors);

                existing.total_count += delta;
                existing.severity = severity.clone();
                existing.latest_errors = merged.clone();

                counters.insert(aggregation_key.clone(), total_count);
                accumulator.insert(aggregation_key.clone(), merged);
                delta
            } else {
                counters.insert(aggregation_key.clone(), total_count);
                accumulator.insert(aggregation_key.clone(), latest_errors.clone());
                self.aggregates.insert(
                    aggregation_key.clone(),
                    ErrorAggregate {
                        aggregation_key: aggregation_key.clone(),
                        total_count,
                        severity: severity.clone(),
                        latest_errors,
                    },
                );
                total_count
            };

            observations.push(Observation {
                aggregation_key,
                severity,
                target: payload.target.clone(),
                delta,
            });
        }

        observations
    }
}

/// Merge two sample lists and keep them ordered most recent first. The sort
/// is stable, so samples with equal timestamps keep their relative order and
/// re-merging identical input yields identical output.
fn combine_latest_errors(
    mut first: Vec<ErrorWithContext>,
    second: Vec<ErrorWithContext>,
    cap: Option<usize>,
) -> Vec<ErrorWithContext> {
    first.extend(second);
    first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(n) = cap {
        first.truncate(n);
    }
    first
}
