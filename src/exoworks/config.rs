// SPDX-License-Identifier: MIT

//! Environment-driven configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by the binary:
//! - `EXO_SIM_LATENCY_SCALE` - multiplier for simulated latency (default 1.0)
//! - `EXO_WORKFLOWS_DIR` - directory of workflow documents (default `workflows`)
//! - `EXO_SERVER_PORT` - HTTP port (default 3000)

use std::path::PathBuf;

use crate::exoworks::mock::SimulatorConfig;
use crate::sdk::error::ExoError;

pub const LATENCY_SCALE_VAR: &str = "EXO_SIM_LATENCY_SCALE";
pub const WORKFLOWS_DIR_VAR: &str = "EXO_WORKFLOWS_DIR";
pub const SERVER_PORT_VAR: &str = "EXO_SERVER_PORT";

pub const DEFAULT_WORKFLOWS_DIR: &str = "workflows";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub simulator: SimulatorConfig,
    pub workflows_dir: PathBuf,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            workflows_dir: PathBuf::from(DEFAULT_WORKFLOWS_DIR),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ExoError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(LATENCY_SCALE_VAR) {
            let scale: f64 = raw.trim().parse().map_err(|_| {
                ExoError::config(format!("{} must be a number, got '{}'", LATENCY_SCALE_VAR, raw))
            })?;
            if !scale.is_finite() || scale < 0.0 {
                return Err(ExoError::config(format!(
                    "{} must be a non-negative number, got '{}'",
                    LATENCY_SCALE_VAR, raw
                )));
            }
            config.simulator.latency_scale = scale;
        }

        if let Some(dir) = lookup(WORKFLOWS_DIR_VAR) {
            if !dir.trim().is_empty() {
                config.workflows_dir = PathBuf::from(dir);
            }
        }

        if let Some(raw) = lookup(SERVER_PORT_VAR) {
            config.server_port = raw.trim().parse().map_err(|_| {
                ExoError::config(format!("{} must be a port number, got '{}'", SERVER_PORT_VAR, raw))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.simulator.latency_scale, 1.0);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (LATENCY_SCALE_VAR, "0"),
            (WORKFLOWS_DIR_VAR, "/srv/flows"),
            (SERVER_PORT_VAR, "8080"),
        ]))
        .unwrap();

        assert_eq!(config.simulator.latency_scale, 0.0);
        assert_eq!(config.workflows_dir, PathBuf::from("/srv/flows"));
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = AppConfig::from_lookup(lookup_from(&[(LATENCY_SCALE_VAR, "fast")])).unwrap_err();
        assert!(matches!(err, ExoError::Config(_)));

        assert!(AppConfig::from_lookup(lookup_from(&[(LATENCY_SCALE_VAR, "-1")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[(SERVER_PORT_VAR, "99999")])).is_err());
    }
}
