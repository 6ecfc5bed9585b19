/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct ProcessorStats {
    fetch_total: AtomicU64,
    fetch_ok: AtomicU64,
    fetch_timeout: AtomicU64,
    fetch_fail: AtomicU64,
}

macro_rules! impl_for_field {
    ($add:ident, $take:ident, $field:ident) => {
        pub(crate) fn $add(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }

        pub(crate) fn $take(&self) -> u64 {
            self.$field.swap(0, Ordering::Relaxed)
        }
    };
}

impl ProcessorStats {
    impl_for_field!(add_fetch_total, take_fetch_total, fetch_total);
    impl_for_field!(add_fetch_ok, take_fetch_ok, fetch_ok);
    impl_for_field!(add_fetch_timeout, take_fetch_timeout, fetch_timeout);
    impl_for_field!(add_fetch_fail, take_fetch_fail, fetch_fail);
}
