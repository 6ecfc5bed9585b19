/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::anyhow;
use yaml_rust::{Yaml, YamlLoader, yaml};

use crate::yaml::{foreach_kv, key};

pub(crate) mod resolver;
pub mod runtime;
pub(crate) mod service;
pub(crate) mod stat;

pub fn load() -> anyhow::Result<&'static Path> {
    let config_file =
        crate::opts::config_file().ok_or_else(|| anyhow!("no config file set"))?;

    let contents = std::fs::read_to_string(config_file)
        .map_err(|e| anyhow!("failed to read {}: {e}", config_file.display()))?;
    let docs = YamlLoader::load_from_str(&contents)
        .map_err(|e| anyhow!("failed to parse {}: {e}", config_file.display()))?;

    // allow multiple docs, and treat them as the same
    for doc in &docs {
        match doc {
            Yaml::Hash(map) => load_doc(map)?,
            _ => return Err(anyhow!("yaml doc root should be hash")),
        }
    }

    Ok(config_file)
}

fn load_doc(map: &yaml::Hash) -> anyhow::Result<()> {
    foreach_kv(map, |k, v| match key::normalize(k).as_str() {
        "runtime" => runtime::load(v),
        "stat" => stat::load(v, crate::build::PKG_NAME),
        "service" | "services" => service::load_all(v),
        _ => Err(anyhow!("invalid key {k} in main conf")),
    })?;
    Ok(())
}
