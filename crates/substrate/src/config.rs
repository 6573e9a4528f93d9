//! Loader for the YAML backend config file (spec §6): `service_name -> {
//! service: [host:port, ...]?, database: host:port?, redis: host:port? }`.
//!
//! The substrate builds a pool for every endpoint this file names, whether or
//! not the local service happens to use all of them; unknown top-level keys
//! are ignored by `serde`'s default (non-`deny_unknown_fields`) behavior.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackendEntry {
    #[serde(default)]
    pub service: Option<Vec<String>>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub redis: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackendConfig {
    #[serde(flatten)]
    pub entries: HashMap<String, BackendEntry>,
}

impl BackendConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading backend config at {}", path.display()))?;
        let config: BackendConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing backend config at {}", path.display()))?;
        Ok(config)
    }

    /// `(host, port)` pairs for a logical peer service's `service:` list.
    pub fn service_endpoints(&self, name: &str) -> Result<Vec<(String, u16)>> {
        let entry = self
            .entries
            .get(name)
            .with_context(|| format!("backend config has no entry for {name:?}"))?;
        let addrs = entry
            .service
            .as_ref()
            .with_context(|| format!("backend config entry {name:?} has no `service` list"))?;
        addrs.iter().map(|a| parse_host_port(a)).collect()
    }

    pub fn database_endpoint(&self, name: &str) -> Result<(String, u16)> {
        let entry = self
            .entries
            .get(name)
            .with_context(|| format!("backend config has no entry for {name:?}"))?;
        let addr = entry
            .database
            .as_ref()
            .with_context(|| format!("backend config entry {name:?} has no `database`"))?;
        parse_host_port(addr)
    }

    pub fn redis_endpoint(&self, name: &str) -> Result<(String, u16)> {
        let entry = self
            .entries
            .get(name)
            .with_context(|| format!("backend config has no entry for {name:?}"))?;
        let addr = entry
            .redis
            .as_ref()
            .with_context(|| format!("backend config entry {name:?} has no `redis`"))?;
        parse_host_port(addr)
    }
}

fn parse_host_port(addr: &str) -> Result<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .with_context(|| format!("expected host:port, got {addr:?}"))?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("invalid port in {addr:?}"))?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_a_minimal_backend_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "account:\n  service:\n    - \"10.0.0.1:9001\"\n    - \"10.0.0.2:9001\"\n  database: \"10.0.0.3:5432\"\ntrending:\n  redis: \"10.0.0.4:6379\"\nunknown_future_key:\n  whatever: true\n"
        )
        .unwrap();
        let config = BackendConfig::load(file.path()).unwrap();
        assert_eq!(
            config.service_endpoints("account").unwrap(),
            vec![
                ("10.0.0.1".to_string(), 9001),
                ("10.0.0.2".to_string(), 9001)
            ]
        );
        assert_eq!(
            config.database_endpoint("account").unwrap(),
            ("10.0.0.3".to_string(), 5432)
        );
        assert_eq!(
            config.redis_endpoint("trending").unwrap(),
            ("10.0.0.4".to_string(), 6379)
        );
    }
}
