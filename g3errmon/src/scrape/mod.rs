/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::{Context, anyhow};
use log::debug;

use crate::processor::{ArcProcessor, HttpProcessor, ProcessorStats};
use crate::stat::ScrapeMetrics;
use crate::store::ArcErrorsRepository;
use crate::types::NodeName;

mod aggregate;
pub(crate) use aggregate::Observation;

mod dispatch;

mod task;
use task::ScrapeTask;

/// Spawn one scrape task per configured service. Returns the per-service
/// processor stats for the stat thread to drain.
pub(crate) fn spawn_all(
    repository: &ArcErrorsRepository,
) -> anyhow::Result<Vec<(NodeName, Arc<ProcessorStats>)>> {
    let stat_config = crate::config::stat::get_global_stat_config();

    let mut all_stats = Vec::new();
    for config in crate::config::service::get_all() {
        let service = config.name().clone();

        let resolver_config = config
            .resolver
            .as_ref()
            .ok_or_else(|| anyhow!("service {service}: no resolver configured"))?;
        let addr_receiver = crate::resolve::spawn(&service, resolver_config);

        let stats = Arc::new(ProcessorStats::default());
        let processor: ArcProcessor = Arc::new(
            HttpProcessor::new(config.fetch_timeout, stats.clone())
                .context(format!("service {service}: failed to build processor"))?,
        );

        let metrics = match &stat_config {
            Some(stat_config) => {
                let client = stat_config
                    .build()
                    .context(format!("service {service}: failed to build statsd client"))?;
                Some(ScrapeMetrics::new(client, &service))
            }
            None => None,
        };

        let scrape_task = ScrapeTask::new(
            config,
            addr_receiver,
            processor,
            repository.clone(),
            metrics,
        );
        tokio::spawn(scrape_task.into_running());
        debug!("service {service}: scrape task spawned");

        all_stats.push((service, stats));
    }

    Ok(all_stats)
}
