/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod name;
pub(crate) use name::NodeName;

mod report;
pub(crate) use report::{
    ErrorAggregate, ErrorInstance, ErrorWithContext, HttpContext, InstanceReport, ResponsePayload,
};
