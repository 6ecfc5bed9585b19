/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

const CONFIG_KEY_RESOLVER_TYPE: &str = "type";

const DEFAULT_DNS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum AnyResolverConfig {
    Static(StaticResolverConfig),
    Dns(DnsResolverConfig),
}

impl AnyResolverConfig {
    pub(crate) fn parse(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for 'resolver' should be 'map'"));
        };
        let resolver_type = crate::yaml::get_required_str(map, CONFIG_KEY_RESOLVER_TYPE)?;
        match crate::yaml::key::normalize(resolver_type).as_str() {
            "static" => {
                let resolver = StaticResolverConfig::parse(map)
                    .context("failed to load this Static resolver")?;
                Ok(AnyResolverConfig::Static(resolver))
            }
            "dns" => {
                let resolver =
                    DnsResolverConfig::parse(map).context("failed to load this Dns resolver")?;
                Ok(AnyResolverConfig::Dns(resolver))
            }
            _ => Err(anyhow!("unsupported resolver type {resolver_type}")),
        }
    }
}

/// A fixed address list, delivered as a single snapshot at spawn time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StaticResolverConfig {
    pub(crate) addresses: Vec<String>,
}

impl StaticResolverConfig {
    fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = StaticResolverConfig::default();
        crate::yaml::foreach_kv(map, |k, v| config.set(k, v))?;
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match crate::yaml::key::normalize(k).as_str() {
            CONFIG_KEY_RESOLVER_TYPE => Ok(()),
            "addresses" | "address" => {
                self.addresses = crate::yaml::value::as_list(v, crate::yaml::value::as_string)
                    .context(format!("invalid list of address strings for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}

/// Periodic re-resolution of a DNS name, one snapshot per observed change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DnsResolverConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) refresh_interval: Duration,
}

impl DnsResolverConfig {
    fn new() -> Self {
        DnsResolverConfig {
            host: String::new(),
            port: 0,
            refresh_interval: DEFAULT_DNS_REFRESH_INTERVAL,
        }
    }

    fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = DnsResolverConfig::new();
        crate::yaml::foreach_kv(map, |k, v| config.set(k, v))?;
        config.check()?;
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match crate::yaml::key::normalize(k).as_str() {
            CONFIG_KEY_RESOLVER_TYPE => Ok(()),
            "host" => {
                self.host = crate::yaml::value::as_string(v)?;
                Ok(())
            }
            "port" => {
                self.port = crate::yaml::value::as_u16(v)?;
                Ok(())
            }
            "refresh_interval" => {
                self.refresh_interval = crate::yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            return Err(anyhow!("host is not set"));
        }
        if self.port == 0 {
            return Err(anyhow!("port is not set"));
        }
        Ok(())
    }
}
