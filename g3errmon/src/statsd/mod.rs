/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod sink;
use sink::MetricsSink;

mod client;
pub(crate) use client::StatsdClient;

mod tag;
pub(crate) use tag::StatsdTagGroup;

mod config;
pub(crate) use config::{StatsdBackend, StatsdClientConfig};
