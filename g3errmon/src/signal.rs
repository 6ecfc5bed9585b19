/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use log::info;

#[cfg(unix)]
pub(crate) async fn wait_for_quit() -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to setup SIGTERM handler")?;

    tokio::select! {
        r = tokio::signal::ctrl_c() => {
            r.map_err(|e| anyhow!("failed to wait for SIGINT: {e}"))?;
            info!("SIGINT received, start shutdown");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received, start shutdown");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_quit() -> anyhow::Result<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow!("failed to wait for CTRL+C: {e}"))?;
    info!("CTRL+C received, start shutdown");
    Ok(())
}
