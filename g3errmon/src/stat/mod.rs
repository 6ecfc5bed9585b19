/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};

use crate::processor::ProcessorStats;
use crate::statsd::StatsdClientConfig;
use crate::types::NodeName;

mod metrics;
pub(crate) use metrics::ScrapeMetrics;

pub(crate) const TAG_KEY_SERVICE: &str = "service";

pub(crate) fn spawn_working_thread(
    config: StatsdClientConfig,
    processor_stats: Vec<(NodeName, Arc<ProcessorStats>)>,
) -> anyhow::Result<JoinHandle<()>> {
    let mut client = config.build().context("failed to build statsd client")?;
    let emit_interval = config.emit_interval;

    let handle = std::thread::Builder::new()
        .name("stat-main".to_string())
        .spawn(move || loop {
            let instant_start = Instant::now();

            for (service, stats) in &processor_stats {
                metrics::emit_processor_stats(&mut client, service, stats);
            }
            client.flush_sink();

            wait_duration(emit_interval, instant_start);
        })
        .map_err(|e| anyhow!("failed to spawn thread: {e:?}"))?;
    Ok(handle)
}

fn wait_duration(emit_interval: Duration, instant_start: Instant) {
    if let Some(d) = emit_interval.checked_sub(instant_start.elapsed()) {
        std::thread::sleep(d)
    }
}
