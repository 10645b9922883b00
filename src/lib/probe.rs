// SPDX-License-Identifier: Apache-2.0

use std::net::Ipv4Addr;
use std::path::Path;

use crate::{
    ip::parse_ipv4, BackendKind, CurrentNetworkState, ErrorKind, HostOps,
    InterfaceInfo, KernelState, OsInfo, SetIpError,
};

const NM_CLI: &str = "nmcli";
const NM_SERVICE: &str = "NetworkManager";
const NETPLAN_CONF_EXTENSION: &str = "yaml";
pub(crate) const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";
// Holding the upstream DNS servers when systemd-resolved is in use, the
// /etc/resolv.conf only contains the 127.0.0.53 stub then.
pub(crate) const RESOLVED_RESOLV_CONF_PATH: &str =
    "/run/systemd/resolve/resolv.conf";

/// Decide which backend owns the network configuration of this host.
/// NetworkManager wins whenever it is running, even on Ubuntu holding
/// netplan files.
pub fn detect_backend(
    os: &OsInfo,
    host: &dyn HostOps,
    netplan_dir: &Path,
    network_scripts_dir: &Path,
) -> Result<BackendKind, SetIpError> {
    if is_nm_running(host) {
        log::info!("NetworkManager is running, using it as backend");
        return Ok(BackendKind::NetworkManager);
    }
    if os.is_ubuntu() {
        if has_netplan_conf(host, netplan_dir)? {
            log::info!(
                "Found netplan configuration in {}, using netplan as backend",
                netplan_dir.display()
            );
            return Ok(BackendKind::Netplan);
        }
    } else if host.path_exists(network_scripts_dir) {
        log::info!(
            "Found {}, using network-scripts as backend",
            network_scripts_dir.display()
        );
        return Ok(BackendKind::LegacyScripts);
    }

    let e = SetIpError::new(
        ErrorKind::NoBackendDetected,
        format!(
            "No supported network backend found on {os}: NetworkManager \
            is not running{}. You may install NetworkManager by \
            '{}' and start it by 'systemctl enable --now NetworkManager'",
            if os.is_ubuntu() {
                format!(" and no netplan config in {}", netplan_dir.display())
            } else {
                format!(" and no {} folder", network_scripts_dir.display())
            },
            os.package_manager.install_command(NM_SERVICE)
        ),
    );
    log::error!("{}", e);
    Err(e)
}

fn is_nm_running(host: &dyn HostOps) -> bool {
    if !host.command_exists(NM_CLI) {
        log::debug!("{} not found", NM_CLI);
        return false;
    }
    let unit = format!("{NM_SERVICE}.service");
    let output =
        match host.run("systemctl", &["list-unit-files", unit.as_str()]) {
            Ok(o) => o,
            Err(e) => {
                log::debug!("Failed to query systemd for {}: {}", unit, e);
                return false;
            }
        };
    if !output.success || !output.stdout.lines().any(|l| l.starts_with(&unit))
    {
        log::debug!("{} is not registered to systemd", unit);
        return false;
    }
    let output = match host.run("systemctl", &["is-active", NM_SERVICE]) {
        Ok(o) => o,
        Err(e) => {
            log::debug!("Failed to query status of {}: {}", NM_SERVICE, e);
            return false;
        }
    };
    let status = output.stdout.trim();
    log::debug!("{} status: {}", NM_SERVICE, status);
    !matches!(status, "" | "inactive" | "failed")
}

fn has_netplan_conf(
    host: &dyn HostOps,
    netplan_dir: &Path,
) -> Result<bool, SetIpError> {
    if !host.path_exists(netplan_dir) {
        return Ok(false);
    }
    Ok(host.list_dir(netplan_dir)?.iter().any(|p| {
        p.extension().and_then(|e| e.to_str()) == Some(NETPLAN_CONF_EXTENSION)
    }))
}

/// All interfaces except loopback.
pub fn list_interfaces(state: &KernelState) -> Vec<InterfaceInfo> {
    state
        .interfaces
        .iter()
        .filter(|i| !i.is_loopback && i.name != "lo")
        .cloned()
        .collect()
}

/// First IPv4 name server of resolver configuration.
pub fn current_dns(host: &dyn HostOps) -> Option<Ipv4Addr> {
    for path in [RESOLVED_RESOLV_CONF_PATH, RESOLV_CONF_PATH] {
        let path = Path::new(path);
        if !host.path_exists(path) {
            continue;
        }
        match host.read_file(path) {
            Ok(content) => {
                if let Some(dns) = parse_resolv_conf(&content) {
                    return Some(dns);
                }
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
            }
        }
    }
    None
}

fn parse_resolv_conf(content: &str) -> Option<Ipv4Addr> {
    content.lines().find_map(|line| {
        let mut words = line.split_whitespace();
        if words.next() == Some("nameserver") {
            words.next().and_then(parse_ipv4)
        } else {
            None
        }
    })
}

/// Current prefix length, gateway and DNS of specified interface.
pub fn current_state(
    host: &dyn HostOps,
    state: &KernelState,
    iface_name: &str,
) -> CurrentNetworkState {
    let ret = CurrentNetworkState::new(
        state.current_prefix(iface_name),
        state.current_gateway(iface_name),
        current_dns(host),
    );
    log::info!("Current settings of {}: {:?}", iface_name, ret);
    ret
}

/// Choose the interface to configure out of the candidates.
pub trait InterfaceSelector {
    fn select(&self, candidates: &[InterfaceInfo])
        -> Result<String, SetIpError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Interface named by user up front.
pub struct FixedInterface(pub String);

impl InterfaceSelector for FixedInterface {
    fn select(
        &self,
        candidates: &[InterfaceInfo],
    ) -> Result<String, SetIpError> {
        if candidates.iter().any(|i| i.name == self.0) {
            Ok(self.0.clone())
        } else {
            let names: Vec<&str> =
                candidates.iter().map(|i| i.name.as_str()).collect();
            Err(SetIpError::new(
                ErrorKind::InvalidArgument,
                format!(
                    "Interface {} not found, available interfaces: {}",
                    self.0,
                    names.join(", ")
                ),
            ))
        }
    }
}
