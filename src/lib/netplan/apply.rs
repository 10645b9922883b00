// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use crate::{
    backend::effective_prefix,
    host::run_checked,
    netplan::conf::{
        NetplanConf, NetplanNameservers, NetplanRoute, IPV4_DEFAULT_ROUTE,
    },
    BackendKind, CurrentNetworkState, HostOps, Mode, NetworkBackend,
    NetworkIntent, SetIpError,
};

const NETPLAN_CONF_EXTENSION: &str = "yaml";
const OVERRIDE_FILE_PREFIX: &str = "99-setip-";
const BACKUP_TIME_FORMAT: &str = "%Y%m%d%H%M%S";
// Netplan warns about world readable configuration
const NETPLAN_CONF_MODE: u32 = 0o600;

/// Backend writing netplan override file `99-setip-<iface>.yaml` which
/// sorts after the distribution provided files and hence wins.
pub struct NetplanBackend<'a> {
    host: &'a dyn HostOps,
    netplan_dir: PathBuf,
}

impl<'a> NetplanBackend<'a> {
    pub fn new(host: &'a dyn HostOps, netplan_dir: &Path) -> Self {
        Self {
            host,
            netplan_dir: netplan_dir.to_path_buf(),
        }
    }

    pub(crate) fn override_path(&self, iface_name: &str) -> PathBuf {
        self.netplan_dir.join(format!(
            "{OVERRIDE_FILE_PREFIX}{iface_name}.{NETPLAN_CONF_EXTENSION}"
        ))
    }

    // Copy every netplan file to `<name>.setip-<timestamp>.bak`.
    fn backup_confs(&self) -> Result<Vec<PathBuf>, SetIpError> {
        let timestamp = chrono::Local::now().format(BACKUP_TIME_FORMAT);
        let mut ret = Vec::new();
        for path in self.host.list_dir(&self.netplan_dir)? {
            if path.extension().and_then(|e| e.to_str())
                != Some(NETPLAN_CONF_EXTENSION)
            {
                continue;
            }
            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            let backup_path = self
                .netplan_dir
                .join(format!("{file_name}.setip-{timestamp}.bak"));
            self.host.copy_file(&path, &backup_path)?;
            log::info!(
                "Backed up {} to {}",
                path.display(),
                backup_path.display()
            );
            ret.push(backup_path);
        }
        Ok(ret)
    }

    fn load_override(&self, path: &Path) -> NetplanConf {
        if !self.host.path_exists(path) {
            return NetplanConf::default();
        }
        match self
            .host
            .read_file(path)
            .and_then(|c| Ok(serde_yaml::from_str::<NetplanConf>(&c)?))
        {
            Ok(c) => c,
            Err(e) => {
                log::warn!(
                    "Discarding unparsable override {}: {}",
                    path.display(),
                    e
                );
                NetplanConf::default()
            }
        }
    }
}

impl<'a> NetworkBackend for NetplanBackend<'a> {
    fn kind(&self) -> BackendKind {
        BackendKind::Netplan
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
        let prefix_length = effective_prefix(intent, current.prefix_length)?;
        self.backup_confs()?;

        let path = self.override_path(&intent.interface);
        let mut conf = self.load_override(&path);
        let eth = conf
            .network
            .ethernets
            .entry(intent.interface.clone())
            .or_default();
        // DHCP stays untouched when only DNS changes
        if let (Some(ip), Some(prefix_length)) = (intent.ip, prefix_length) {
            eth.dhcp4 = Some(false);
            eth.addresses = Some(vec![format!("{ip}/{prefix_length}")]);
        }
        if let Some(gateway) = intent.gateway {
            let mut routes: Vec<NetplanRoute> = eth
                .routes
                .take()
                .unwrap_or_default()
                .into_iter()
                .filter(|r| !r.is_default())
                .collect();
            routes.push(NetplanRoute {
                to: IPV4_DEFAULT_ROUTE.to_string(),
                via: gateway.to_string(),
            });
            eth.routes = Some(routes);
        }
        if let Some(dns) = intent.dns {
            let search = eth.nameservers.take().and_then(|n| n.search);
            eth.nameservers = Some(NetplanNameservers {
                addresses: vec![dns.to_string()],
                search,
            });
        }

        self.host.write_file(
            &path,
            &serde_yaml::to_string(&conf)?,
            NETPLAN_CONF_MODE,
        )?;
        log::info!("Wrote netplan override {}", path.display());

        run_checked(self.host, "netplan", &["apply"])?;
        log::info!("Applied netplan configuration");
        Ok(())
    }
}
