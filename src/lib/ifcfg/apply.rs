// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use crate::{
    backend::effective_prefix, host::run_checked, ifcfg::file::IfcfgFile,
    ip::prefix_to_mask, BackendKind, CurrentNetworkState, HostOps, Mode,
    NetworkBackend, NetworkIntent, SetIpError,
};

const IFCFG_FILE_PREFIX: &str = "ifcfg-";
const IFCFG_FILE_MODE: u32 = 0o644;
const NETWORK_SERVICE: &str = "network";

/// Backend editing `ifcfg-<iface>` of legacy network-scripts and
/// restarting the `network` service.
pub struct IfcfgBackend<'a> {
    host: &'a dyn HostOps,
    network_scripts_dir: PathBuf,
}

impl<'a> IfcfgBackend<'a> {
    pub fn new(host: &'a dyn HostOps, network_scripts_dir: &Path) -> Self {
        Self {
            host,
            network_scripts_dir: network_scripts_dir.to_path_buf(),
        }
    }

    pub(crate) fn ifcfg_path(&self, iface_name: &str) -> PathBuf {
        self.network_scripts_dir
            .join(format!("{IFCFG_FILE_PREFIX}{iface_name}"))
    }

    fn load(
        &self,
        path: &Path,
        iface_name: &str,
    ) -> Result<IfcfgFile, SetIpError> {
        if self.host.path_exists(path) {
            Ok(IfcfgFile::parse(&self.host.read_file(path)?))
        } else {
            log::info!("Creating new {}", path.display());
            Ok(IfcfgFile::new_for_iface(iface_name))
        }
    }
}

impl<'a> NetworkBackend for IfcfgBackend<'a> {
    fn kind(&self) -> BackendKind {
        BackendKind::LegacyScripts
    }

    fn host(&self) -> &dyn HostOps {
        self.host
    }

    fn apply(
        &self,
        intent: &NetworkIntent,
        _mode: Mode,
        current: &CurrentNetworkState,
    ) -> Result<(), SetIpError> {
        let path = self.ifcfg_path(&intent.interface);
        let mut ifcfg = self.load(&path, &intent.interface)?;
        let prefix_length = effective_prefix(intent, current.prefix_length)?;

        if let (Some(ip), Some(prefix_length)) = (intent.ip, prefix_length) {
            ifcfg.remove(&["IPADDR", "NETMASK", "PREFIX"]);
            ifcfg.append("IPADDR", &ip.to_string());
            ifcfg.append(
                "NETMASK",
                &prefix_to_mask(prefix_length).to_string(),
            );
            if ifcfg
                .get("BOOTPROTO")
                .map(|b| b.eq_ignore_ascii_case("dhcp"))
                .unwrap_or_default()
            {
                log::info!(
                    "Switching {} from DHCP to static",
                    intent.interface
                );
                ifcfg.replace("BOOTPROTO", "none");
            }
        }
        if let Some(gateway) = intent.gateway {
            ifcfg.remove(&["GATEWAY"]);
            ifcfg.append("GATEWAY", &gateway.to_string());
        }
        if let Some(dns) = intent.dns {
            ifcfg.remove(&["DNS1"]);
            ifcfg.append("DNS1", &dns.to_string());
        }

        self.host
            .write_file(&path, &ifcfg.to_string(), IFCFG_FILE_MODE)?;
        log::info!("Wrote {}", path.display());

        run_checked(self.host, "systemctl", &["restart", NETWORK_SERVICE])?;
        log::info!("Restarted {} service", NETWORK_SERVICE);
        Ok(())
    }
}
