// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const NETPLAN_VERSION: u8 = 2;
pub(crate) const IPV4_DEFAULT_ROUTE: &str = "0.0.0.0/0";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
/// Netplan YAML document. Example of override generated for eth0:
/// ```yaml
/// network:
///   version: 2
///   ethernets:
///     eth0:
///       dhcp4: false
///       addresses:
///       - 192.0.2.10/24
///       routes:
///       - to: 0.0.0.0/0
///         via: 192.0.2.1
///       nameservers:
///         addresses:
///         - 192.0.2.53
/// ```
pub(crate) struct NetplanConf {
    pub(crate) network: NetplanNetwork,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub(crate) struct NetplanNetwork {
    #[serde(default = "default_version")]
    pub(crate) version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) renderer: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) ethernets: BTreeMap<String, NetplanEthernet>,
}

impl Default for NetplanNetwork {
    fn default() -> Self {
        Self {
            version: default_version(),
            renderer: None,
            ethernets: BTreeMap::new(),
        }
    }
}

fn default_version() -> u8 {
    NETPLAN_VERSION
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub(crate) struct NetplanEthernet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) dhcp4: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) addresses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) routes: Option<Vec<NetplanRoute>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) nameservers: Option<NetplanNameservers>,
    // Properties setip does not manage but user added to the override.
    #[serde(flatten)]
    pub(crate) others: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub(crate) struct NetplanRoute {
    pub(crate) to: String,
    pub(crate) via: String,
}

impl NetplanRoute {
    pub(crate) fn is_default(&self) -> bool {
        self.to == IPV4_DEFAULT_ROUTE || self.to == "default"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub(crate) struct NetplanNameservers {
    #[serde(default)]
    pub(crate) addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) search: Option<Vec<String>>,
}
