/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use ::log::warn;

pub mod config;
pub mod log;
pub mod opts;

mod build;

mod processor;
mod resolve;
mod scrape;
mod signal;
mod stat;
mod statsd;
mod store;
mod types;
mod yaml;

use opts::ProcArgs;
use store::{ArcErrorsRepository, MemoryErrorsRepository};

pub async fn run(_proc_args: &ProcArgs) -> anyhow::Result<()> {
    let repository: ArcErrorsRepository = Arc::new(MemoryErrorsRepository::default());

    let processor_stats = scrape::spawn_all(&repository)?;

    if let Some(stat_config) = config::stat::get_global_stat_config() {
        stat::spawn_working_thread(stat_config, processor_stats)?;
    } else {
        warn!("no stat config set, metrics emission is disabled");
    }

    signal::wait_for_quit().await
}
