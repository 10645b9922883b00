// SPDX-License-Identifier: Apache-2.0

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use setip::{SetIpOptions, VerifyOptions};

use crate::error::CliError;

const DEFAULT_VERIFY_TIMEOUT: u64 = 10;
const DEFAULT_VERIFY_INTERVAL_MS: u64 = 500;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) verify: VerifyConfig,
    #[serde(default)]
    pub(crate) paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct VerifyConfig {
    /// Seconds to wait for the new address to show up
    #[serde(default = "default_timeout")]
    pub(crate) timeout: u64,
    #[serde(default = "default_interval_ms")]
    pub(crate) interval_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_VERIFY_TIMEOUT
}

fn default_interval_ms() -> u64 {
    DEFAULT_VERIFY_INTERVAL_MS
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct PathsConfig {
    pub(crate) netplan_dir: Option<PathBuf>,
    pub(crate) network_scripts_dir: Option<PathBuf>,
}

impl Config {
    pub(crate) const DEFAULT_CONFIG_PATH: &'static str =
        "/etc/setip/setip.conf";

    pub(crate) fn load(path: &str) -> Result<Self, CliError> {
        let path = std::path::Path::new(path);
        if !path.exists() {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        let mut fd = std::fs::File::open(path)?;
        let mut content = String::new();
        fd.read_to_string(&mut content)?;
        match Self::parse(&content) {
            Ok(c) => {
                log::info!("Configuration loaded:\n{content}");
                Ok(c)
            }
            Err(e) => Err(CliError::from(format!(
                "Failed to read configuration from {}: {e}",
                path.display()
            ))),
        }
    }

    pub(crate) fn parse(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str::<Config>(content)?)
    }

    /// Command line `--timeout` wins over configuration file, `--no-verify`
    /// disables verification entirely.
    pub(crate) fn to_options(
        &self,
        no_verify: bool,
        timeout: Option<u64>,
    ) -> SetIpOptions {
        let mut opts = SetIpOptions::default();
        if let Some(d) = self.paths.netplan_dir.as_ref() {
            opts.netplan_dir = d.clone();
        }
        if let Some(d) = self.paths.network_scripts_dir.as_ref() {
            opts.network_scripts_dir = d.clone();
        }
        opts.verify = if no_verify {
            None
        } else {
            Some(VerifyOptions::new(
                Duration::from_secs(timeout.unwrap_or(self.verify.timeout)),
                Duration::from_millis(self.verify.interval_ms),
            ))
        };
        opts
    }
}
