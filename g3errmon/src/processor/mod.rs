/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::types::ResponsePayload;

mod http;
pub(crate) use http::HttpProcessor;

mod stats;
pub(crate) use stats::ProcessorStats;

/// One fetch to run against one instance. The worker either sends exactly one
/// payload or sends nothing; dropping the sender is the completion signal the
/// fan-out dispatcher relies on.
pub(crate) struct FetchRequest {
    pub(crate) target: String,
    pub(crate) rsp_sender: mpsc::Sender<ResponsePayload>,
}

pub(crate) trait Processor {
    fn enqueue(&self, request: FetchRequest);
}

pub(crate) type ArcProcessor = Arc<dyn Processor + Send + Sync>;
