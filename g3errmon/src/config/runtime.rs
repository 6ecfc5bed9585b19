/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::num::NonZeroUsize;
use std::sync::OnceLock;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use crate::yaml;

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

pub fn get_runtime_config() -> RuntimeConfig {
    RUNTIME_CONFIG.get().cloned().unwrap_or_default()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    thread_number: Option<NonZeroUsize>,
}

impl RuntimeConfig {
    fn parse(v: &Yaml) -> anyhow::Result<Self> {
        let mut config = RuntimeConfig::default();
        match v {
            Yaml::Hash(map) => {
                yaml::foreach_kv(map, |k, v| config.set(k, v))?;
                Ok(config)
            }
            Yaml::Null => Ok(config),
            _ => Err(anyhow!("yaml value type for 'runtime' should be 'map'")),
        }
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match yaml::key::normalize(k).as_str() {
            "thread_number" | "threads_total" => {
                self.thread_number = Some(
                    yaml::value::as_nonzero_usize(v)
                        .context(format!("invalid nonzero usize value for key {k}"))?,
                );
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    pub fn start(&self) -> io::Result<tokio::runtime::Runtime> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.enable_all();
        builder.thread_name(format!("{}-worker", crate::build::PKG_NAME));
        if let Some(n) = self.thread_number {
            builder.worker_threads(n.get());
        }
        builder.build()
    }
}

pub(super) fn load(v: &Yaml) -> anyhow::Result<()> {
    let config = RuntimeConfig::parse(v).context("invalid runtime config")?;
    RUNTIME_CONFIG
        .set(config)
        .map_err(|_| anyhow!("runtime config has already been set"))
}
