/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use foldhash::fast::FixedState;

use super::ServiceConfig;
use crate::types::NodeName;

static SERVICE_CONFIG_REGISTRY: Mutex<HashMap<NodeName, Arc<ServiceConfig>, FixedState>> =
    Mutex::new(HashMap::with_hasher(FixedState::with_seed(0)));

pub(super) fn add(service: ServiceConfig) -> Option<Arc<ServiceConfig>> {
    let name = service.name().clone();
    let service = Arc::new(service);
    let mut ht = SERVICE_CONFIG_REGISTRY.lock().unwrap();
    ht.insert(name, service)
}

pub(crate) fn get_all() -> Vec<Arc<ServiceConfig>> {
    let ht = SERVICE_CONFIG_REGISTRY.lock().unwrap();
    ht.values().cloned().collect()
}
