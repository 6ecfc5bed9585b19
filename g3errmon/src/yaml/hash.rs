/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

pub(crate) fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

pub(crate) fn get_required_str<'a>(map: &'a yaml::Hash, k: &str) -> anyhow::Result<&'a str> {
    let key = Yaml::String(k.to_owned());
    match map.get(&key) {
        Some(Yaml::String(s)) => Ok(s),
        Some(_) => Err(anyhow!("invalid string value for required key {k}")),
        None => Err(anyhow!("no required key {k} found in this map")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    fn yaml_doc(s: &str) -> Yaml {
        YamlLoader::load_from_str(s).unwrap().pop().unwrap()
    }

    #[test]
    fn foreach_kv_ok() {
        let yaml = yaml_doc("a: 1\nb: 2");
        let hash = yaml.as_hash().unwrap();
        let mut seen = Vec::new();
        foreach_kv(hash, |k, v| {
            seen.push((k.to_string(), v.as_i64().unwrap()));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn foreach_kv_err() {
        let yaml = yaml_doc("123: 1");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |_, _| Ok(())).is_err());

        let yaml = yaml_doc("a: 1");
        let hash = yaml.as_hash().unwrap();
        assert!(foreach_kv(hash, |k, _| Err(anyhow!("error at {k}"))).is_err());
    }

    #[test]
    fn get_required_str_ok() {
        let yaml = yaml_doc("type: dns");
        let hash = yaml.as_hash().unwrap();
        assert_eq!(get_required_str(hash, "type").unwrap(), "dns");
    }

    #[test]
    fn get_required_str_err() {
        let yaml = yaml_doc("type: 123");
        let hash = yaml.as_hash().unwrap();
        assert!(get_required_str(hash, "type").is_err());
        assert!(get_required_str(hash, "missing").is_err());
    }
}
