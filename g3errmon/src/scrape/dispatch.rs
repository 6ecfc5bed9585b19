/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use tokio::sync::mpsc;

use crate::processor::{ArcProcessor, FetchRequest};
use crate::types::ResponsePayload;

/// Dispatch one concurrent fetch per address and return the result stream.
/// Every worker holds a clone of the sender and the local clone is dropped on
/// return, so the receiver yields `None` exactly when the last dispatched
/// fetch has completed, with or without a payload. An empty address list
/// yields an immediately exhausted stream.
pub(super) fn scrape_instances(
    addresses: &[String],
    endpoint: &str,
    processor: &ArcProcessor,
) -> mpsc::Receiver<ResponsePayload> {
    let (rsp_sender, rsp_receiver) = mpsc::channel(addresses.len().max(1));

    for address in addresses {
        let request = FetchRequest {
            target: format!("http://{address}{endpoint}"),
            rsp_sender: rsp_sender.clone(),
        };
        processor.enqueue(request);
    }

    rsp_receiver
}
