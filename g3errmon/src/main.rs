/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::Context;
use log::{debug, info};

fn main() -> anyhow::Result<()> {
    let Some(proc_args) =
        g3errmon::opts::parse_clap().context("failed to parse command line options")?
    else {
        return Ok(());
    };

    // set up the process logger early, only proc args is used inside
    let _log_guard =
        g3errmon::log::setup(&proc_args).context("failed to setup process logger")?;

    let config_file = g3errmon::config::load()
        .context(format!("failed to load config, opts: {:?}", &proc_args))?;
    debug!("loaded config from {}", config_file.display());

    if proc_args.test_config {
        info!("the format of the config file is ok");
        return Ok(());
    }

    let rt = g3errmon::config::runtime::get_runtime_config()
        .start()
        .context("failed to start runtime")?;
    rt.block_on(g3errmon::run(&proc_args))
}
