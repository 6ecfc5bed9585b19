/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{MetricsSink, StatsdClient};
use crate::types::NodeName;
use crate::yaml;

const DEFAULT_CACHE_SIZE: usize = 1024;
const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StatsdBackend {
    Udp(SocketAddr),
}

impl Default for StatsdBackend {
    fn default() -> Self {
        StatsdBackend::Udp(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8125))
    }
}

impl StatsdBackend {
    fn parse_udp_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::Hash(map) => {
                let mut addr: Option<SocketAddr> = None;
                yaml::foreach_kv(map, |k, v| match yaml::key::normalize(k).as_str() {
                    "address" | "addr" => {
                        addr = Some(yaml::value::as_sockaddr(v).context(format!(
                            "invalid statsd udp peer socket address value for key {k}"
                        ))?);
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;
                match addr {
                    Some(addr) => Ok(StatsdBackend::Udp(addr)),
                    None => Err(anyhow!("no target address has been set")),
                }
            }
            Yaml::String(_) => {
                let addr = yaml::value::as_sockaddr(v)?;
                Ok(StatsdBackend::Udp(addr))
            }
            _ => Err(anyhow!("invalid yaml value for udp statsd backend")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StatsdClientConfig {
    pub(crate) backend: StatsdBackend,
    pub(crate) prefix: NodeName,
    pub(crate) cache_size: usize,
    pub(crate) emit_interval: Duration,
}

impl StatsdClientConfig {
    pub(crate) fn with_prefix(prefix: NodeName) -> Self {
        StatsdClientConfig {
            backend: StatsdBackend::default(),
            prefix,
            cache_size: DEFAULT_CACHE_SIZE,
            emit_interval: DEFAULT_EMIT_INTERVAL,
        }
    }

    pub(crate) fn parse_yaml(v: &Yaml, prefix: NodeName) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = v {
            let mut config = StatsdClientConfig::with_prefix(prefix);
            yaml::foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
            Ok(config)
        } else {
            Err(anyhow!(
                "yaml value type for 'statsd client config' should be 'map'"
            ))
        }
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match yaml::key::normalize(k).as_str() {
            "target_udp" | "backend_udp" => {
                self.backend = StatsdBackend::parse_udp_yaml(v)
                    .context(format!("invalid value for key {k}"))?;
            }
            "prefix" => {
                self.prefix = yaml::value::as_node_name(v)
                    .context(format!("invalid metrics name value for key {k}"))?;
            }
            "cache_size" => {
                self.cache_size = yaml::humanize::as_usize(v)
                    .context(format!("invalid humanize usize value for key {k}"))?;
            }
            "emit_interval" => {
                self.emit_interval = yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
            }
            _ => return Err(anyhow!("invalid key {k}")),
        }
        Ok(())
    }

    pub(crate) fn build(&self) -> io::Result<StatsdClient> {
        match self.backend {
            StatsdBackend::Udp(addr) => {
                let bind: SocketAddr = if addr.is_ipv4() {
                    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
                } else {
                    SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
                };
                let socket = UdpSocket::bind(bind)?;
                let sink = MetricsSink::udp_with_capacity(addr, socket, self.cache_size);
                Ok(StatsdClient::new(self.prefix.clone(), sink))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use yaml_rust::YamlLoader;

    fn yaml_doc(s: &str) -> Yaml {
        YamlLoader::load_from_str(s).unwrap().pop().unwrap()
    }

    fn default_prefix() -> NodeName {
        NodeName::from_str("test").unwrap()
    }

    #[test]
    fn parse_yaml_ok() {
        let yaml = yaml_doc(
            r#"
                target_udp: "127.0.0.1:8125"
                prefix: "myapp"
                cache_size: "1KB"
                emit_interval: "500ms"
            "#,
        );
        let config = StatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
        assert_eq!(
            config.backend,
            StatsdBackend::Udp(SocketAddr::from_str("127.0.0.1:8125").unwrap())
        );
        assert_eq!(config.prefix, NodeName::from_str("myapp").unwrap());
        assert_eq!(config.cache_size, 1000);
        assert_eq!(config.emit_interval, Duration::from_millis(500));

        let yaml = yaml_doc(
            r#"
                backend_udp:
                  address: "192.168.1.1:9125"
            "#,
        );
        let config = StatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
        assert_eq!(
            config.backend,
            StatsdBackend::Udp(SocketAddr::from_str("192.168.1.1:9125").unwrap())
        );
        assert_eq!(config.prefix, default_prefix());
        assert_eq!(config.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(config.emit_interval, DEFAULT_EMIT_INTERVAL);
    }

    #[test]
    fn parse_yaml_err() {
        let yaml = yaml_doc("invalid_key: value");
        assert!(StatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc("target_udp: \"invalid-address\"");
        assert!(StatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc("prefix: \"not a name\"");
        assert!(StatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = Yaml::Array(Vec::new());
        assert!(StatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());
    }
}
