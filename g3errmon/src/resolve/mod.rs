/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use tokio::sync::mpsc;

use crate::config::resolver::AnyResolverConfig;
use crate::types::NodeName;

mod dns;
use dns::DnsResolver;

/// One snapshot of the live address set for a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolvedAddresses {
    pub(crate) addresses: Vec<String>,
}

impl ResolvedAddresses {
    pub(crate) fn empty() -> Self {
        ResolvedAddresses::default()
    }
}

/// Spawn the resolver driver for a service and return the snapshot channel.
/// The static driver delivers one snapshot and closes the channel; the dns
/// driver keeps delivering snapshots on every observed change.
pub(crate) fn spawn(
    service: &NodeName,
    config: &AnyResolverConfig,
) -> mpsc::UnboundedReceiver<ResolvedAddresses> {
    let (sender, receiver) = mpsc::unbounded_channel();
    match config {
        AnyResolverConfig::Static(config) => {
            let _ = sender.send(ResolvedAddresses {
                addresses: config.addresses.clone(),
            });
        }
        AnyResolverConfig::Dns(config) => {
            let resolver = DnsResolver::new(service.clone(), config.clone(), sender);
            tokio::spawn(resolver.into_running());
        }
    }
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolver::StaticResolverConfig;
    use std::str::FromStr;

    #[tokio::test]
    async fn static_snapshot() {
        let service = NodeName::from_str("web").unwrap();
        let config = AnyResolverConfig::Static(StaticResolverConfig {
            addresses: vec!["10.0.0.1:3000".to_string()],
        });

        let mut receiver = spawn(&service, &config);
        let resolved = receiver.recv().await.unwrap();
        assert_eq!(resolved.addresses, vec!["10.0.0.1:3000".to_string()]);

        // one snapshot only, then the channel is closed
        assert!(receiver.recv().await.is_none());
    }
}
