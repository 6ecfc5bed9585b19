/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::resolver::AnyResolverConfig;
use crate::types::NodeName;

mod registry;
pub(crate) use registry::get_all;

const CONFIG_KEY_SERVICE_NAME: &str = "name";

const DEFAULT_ENDPOINT: &str = "/errors";
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ServiceConfig {
    name: NodeName,
    pub(crate) endpoint: String,
    pub(crate) refresh_interval: Duration,
    pub(crate) fetch_timeout: Duration,
    pub(crate) max_latest_errors: Option<usize>,
    pub(crate) resolver: Option<AnyResolverConfig>,
}

impl ServiceConfig {
    fn new() -> Self {
        ServiceConfig {
            name: NodeName::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_latest_errors: None,
            resolver: None,
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &NodeName {
        &self.name
    }

    pub(crate) fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut service = ServiceConfig::new();

        crate::yaml::foreach_kv(map, |k, v| service.set(k, v))?;

        service.check()?;
        Ok(service)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match crate::yaml::key::normalize(k).as_str() {
            CONFIG_KEY_SERVICE_NAME => {
                self.name = crate::yaml::value::as_node_name(v)?;
                Ok(())
            }
            "endpoint" => {
                self.endpoint = crate::yaml::value::as_string(v)?;
                Ok(())
            }
            "refresh_interval" => {
                self.refresh_interval = crate::yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "fetch_timeout" => {
                self.fetch_timeout = crate::yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            "max_latest_errors" => {
                let n = crate::yaml::value::as_nonzero_usize(v)
                    .context(format!("invalid nonzero usize value for key {k}"))?;
                self.max_latest_errors = Some(n.get());
                Ok(())
            }
            "resolver" => {
                let resolver = AnyResolverConfig::parse(v)
                    .context(format!("invalid resolver config value for key {k}"))?;
                self.resolver = Some(resolver);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&mut self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            return Err(anyhow!("name is not set"));
        }
        if self.resolver.is_none() {
            return Err(anyhow!("resolver is not set"));
        }
        if !self.endpoint.starts_with('/') {
            return Err(anyhow!("endpoint should be an absolute path"));
        }
        Ok(())
    }
}

pub(super) fn load_all(v: &Yaml) -> anyhow::Result<()> {
    match v {
        Yaml::Hash(map) => load_service(map),
        Yaml::Array(seq) => {
            for (i, v) in seq.iter().enumerate() {
                if let Yaml::Hash(map) = v {
                    load_service(map).context(format!("failed to load service #{i}"))?;
                } else {
                    return Err(anyhow!("invalid yaml value type for service #{i}"));
                }
            }
            Ok(())
        }
        _ => Err(anyhow!(
            "yaml value type for 'service' should be 'map' or 'list'"
        )),
    }
}

fn load_service(map: &yaml::Hash) -> anyhow::Result<()> {
    let service = ServiceConfig::parse(map)?;
    if let Some(old) = registry::add(service) {
        Err(anyhow!("service with name {} already exists", old.name()))
    } else {
        Ok(())
    }
}
