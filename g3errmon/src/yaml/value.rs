/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use crate::types::NodeName;

pub(crate) fn as_u16(v: &Yaml) -> anyhow::Result<u16> {
    match v {
        Yaml::String(s) => Ok(u16::from_str(s)?),
        Yaml::Integer(i) => Ok(u16::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u16' should be 'string' or 'integer'"
        )),
    }
}

pub(crate) fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub(crate) fn as_nonzero_usize(v: &Yaml) -> anyhow::Result<NonZeroUsize> {
    let u = as_usize(v)?;
    Ok(NonZeroUsize::try_from(u)?)
}

pub(crate) fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.to_string()),
        _ => Err(anyhow!(
            "yaml value type for 'string' should be 'string', 'integer' or 'real'"
        )),
    }
}

pub(crate) fn as_node_name(v: &Yaml) -> anyhow::Result<NodeName> {
    let s = as_string(v).context("the yaml value type for a node name should be 'string'")?;
    NodeName::from_str(&s).map_err(|e| anyhow!("invalid node name string: {e}"))
}

pub(crate) fn as_sockaddr(v: &Yaml) -> anyhow::Result<SocketAddr> {
    if let Yaml::String(s) = v {
        SocketAddr::from_str(s).map_err(|e| anyhow!("invalid SocketAddr string {s}: {e}"))
    } else {
        Err(anyhow!(
            "yaml value type for 'SocketAddr' should be 'string'"
        ))
    }
}

pub(crate) fn as_list<T, F>(v: &Yaml, convert: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&Yaml) -> anyhow::Result<T>,
{
    match v {
        Yaml::Array(seq) => {
            let mut list = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                let item = convert(v).context(format!("invalid list value for element #{i}"))?;
                list.push(item);
            }
            Ok(list)
        }
        _ => {
            let item = convert(v)?;
            Ok(vec![item])
        }
    }
}
