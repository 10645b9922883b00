// SPDX-License-Identifier: Apache-2.0

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::Ipv4AddrInfo;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
/// Kernel view of single network interface.
pub struct InterfaceInfo {
    pub name: String,
    pub is_loopback: bool,
    /// Upper case MAC address, empty if interface has none.
    pub mac_address: String,
    /// IPv4 addresses in the order kernel reported, the first one is the
    /// primary address.
    pub ipv4_addresses: Vec<Ipv4AddrInfo>,
}

impl InterfaceInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl std::fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ipv4_addresses.is_empty() {
            write!(f, "{}", self.name)
        } else {
            let addrs: Vec<String> =
                self.ipv4_addresses.iter().map(|a| a.to_string()).collect();
            write!(f, "{} ({})", self.name, addrs.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
/// IPv4 route entry. Destination `None` means default route.
pub struct RouteInfo {
    pub destination: Option<String>,
    pub gateway: Option<Ipv4Addr>,
    pub oif: Option<String>,
}

impl RouteInfo {
    pub fn is_default(&self) -> bool {
        match self.destination.as_deref() {
            None => true,
            Some(d) => d == "0.0.0.0/0" || d == "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
/// Point in time snapshot of kernel interfaces and IPv4 routes.
pub struct KernelState {
    pub interfaces: Vec<InterfaceInfo>,
    pub routes: Vec<RouteInfo>,
}

impl KernelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_iface(&self, iface_name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.iter().find(|i| i.name == iface_name)
    }

    /// Prefix length of first IPv4 address of specified interface.
    pub fn current_prefix(&self, iface_name: &str) -> Option<u8> {
        self.get_iface(iface_name)
            .and_then(|i| i.ipv4_addresses.first())
            .map(|a| a.prefix_length)
    }

    /// Gateway of first default route going out via specified interface.
    pub fn current_gateway(&self, iface_name: &str) -> Option<Ipv4Addr> {
        self.routes
            .iter()
            .filter(|r| r.is_default())
            .filter(|r| r.oif.as_deref() == Some(iface_name))
            .find_map(|r| r.gateway)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "kebab-case")]
/// Current settings of the interface used to fill the gaps of user
/// arguments.
pub struct CurrentNetworkState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<Ipv4Addr>,
}

impl CurrentNetworkState {
    pub fn new(
        prefix_length: Option<u8>,
        gateway: Option<Ipv4Addr>,
        dns: Option<Ipv4Addr>,
    ) -> Self {
        Self {
            prefix_length,
            gateway,
            dns,
        }
    }
}
