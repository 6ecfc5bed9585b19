/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use log::{debug, warn};
use tokio::sync::mpsc;

use super::ResolvedAddresses;
use crate::config::resolver::DnsResolverConfig;
use crate::types::NodeName;

pub(super) struct DnsResolver {
    service: NodeName,
    config: DnsResolverConfig,
    sender: mpsc::UnboundedSender<ResolvedAddresses>,
    last: Option<Vec<String>>,
}

impl DnsResolver {
    pub(super) fn new(
        service: NodeName,
        config: DnsResolverConfig,
        sender: mpsc::UnboundedSender<ResolvedAddresses>,
    ) -> Self {
        DnsResolver {
            service,
            config,
            sender,
            last: None,
        }
    }

    pub(super) async fn into_running(mut self) {
        let mut interval = tokio::time::interval(self.config.refresh_interval);

        loop {
            interval.tick().await;
            match self.resolve_once().await {
                Ok(addresses) => {
                    if self.last.as_ref() == Some(&addresses) {
                        continue;
                    }
                    debug!(
                        "{}: resolved {} to {} addresses",
                        self.service,
                        self.config.host,
                        addresses.len()
                    );
                    if self
                        .sender
                        .send(ResolvedAddresses {
                            addresses: addresses.clone(),
                        })
                        .is_err()
                    {
                        break;
                    }
                    self.last = Some(addresses);
                }
                Err(e) => {
                    // keep the last known snapshot on resolution failure
                    warn!(
                        "{}: failed to resolve {}: {e}",
                        self.service, self.config.host
                    );
                }
            }
        }
    }

    async fn resolve_once(&self) -> io::Result<Vec<String>> {
        let peers =
            tokio::net::lookup_host((self.config.host.as_str(), self.config.port)).await?;
        let mut addresses: Vec<String> = peers.map(|addr| addr.to_string()).collect();
        addresses.sort();
        addresses.dedup();
        Ok(addresses)
    }
}
