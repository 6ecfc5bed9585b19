/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod hash;
pub(crate) use hash::{foreach_kv, get_required_str};

pub(crate) mod humanize;
pub(crate) mod key;
pub(crate) mod value;
