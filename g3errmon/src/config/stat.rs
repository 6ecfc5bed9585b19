/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::anyhow;
use yaml_rust::Yaml;

use crate::statsd::StatsdClientConfig;
use crate::types::NodeName;

static GLOBAL_STAT_CONFIG: OnceLock<StatsdClientConfig> = OnceLock::new();

pub(crate) fn get_global_stat_config() -> Option<StatsdClientConfig> {
    GLOBAL_STAT_CONFIG.get().cloned()
}

pub(super) fn load(v: &Yaml, prefix: &'static str) -> anyhow::Result<()> {
    let prefix =
        NodeName::from_str(prefix).map_err(|e| anyhow!("invalid default metrics prefix: {e}"))?;
    let config = StatsdClientConfig::parse_yaml(v, prefix)?;
    GLOBAL_STAT_CONFIG
        .set(config)
        .map_err(|_| anyhow!("stat config has already been set"))
}
