/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use log::debug;
use thiserror::Error;

use super::{FetchRequest, Processor, ProcessorStats};
use crate::types::{InstanceReport, ResponsePayload};

#[derive(Debug, Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

impl FetchError {
    fn is_timeout(&self) -> bool {
        match self {
            FetchError::Request(e) => e.is_timeout(),
            FetchError::UnexpectedStatus(_) => false,
        }
    }
}

/// Fetches one instance report per request. Every failure is absorbed here:
/// the request completes without a payload and the caller only observes the
/// missing contribution for the cycle.
pub(crate) struct HttpProcessor {
    client: reqwest::Client,
    stats: Arc<ProcessorStats>,
}

impl HttpProcessor {
    pub(crate) fn new(
        fetch_timeout: Duration,
        stats: Arc<ProcessorStats>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| anyhow!("failed to build http client: {e}"))?;
        Ok(HttpProcessor { client, stats })
    }
}

impl Processor for HttpProcessor {
    fn enqueue(&self, request: FetchRequest) {
        let client = self.client.clone();
        let stats = self.stats.clone();

        tokio::spawn(async move {
            stats.add_fetch_total();
            match fetch(&client, &request.target).await {
                Ok(payload) => {
                    stats.add_fetch_ok();
                    let _ = request.rsp_sender.send(payload).await;
                }
                Err(e) => {
                    if e.is_timeout() {
                        stats.add_fetch_timeout();
                    } else {
                        stats.add_fetch_fail();
                    }
                    debug!("failed to fetch {}: {e}", request.target);
                }
            }
        });
    }
}

async fn fetch(client: &reqwest::Client, target: &str) -> Result<ResponsePayload, FetchError> {
    let rsp = client.get(target).send().await?;
    if !rsp.status().is_success() {
        return Err(FetchError::UnexpectedStatus(rsp.status()));
    }
    let report = rsp.json::<InstanceReport>().await?;
    Ok(ResponsePayload {
        target: target.to_string(),
        error_aggregate: report.error_aggregate,
    })
}
