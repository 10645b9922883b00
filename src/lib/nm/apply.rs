// SPDX-License-Identifier: Apache-2.0

use crate::{
    backend::effective_prefix,
    host::run_checked,
    nm::profile::{create_profile, find_profile, stored_address, NM_CLI},
    BackendKind, CurrentNetworkState, HostOps, Mode, NetworkBackend,
    NetworkIntent, SetIpError,
};

/// Backend storing settings into NetworkManager connection profile via
/// `nmcli`.
pub struct NmBackend<'a> {
    host: &'a dyn HostOps,
}

impl<'a> NmBackend<'a> {
    pub fn new(host: &'a dyn HostOps) -> Self {
        Self { host }
    }
}

impl<'a> NetworkBackend for NmBackend<'a> {
    fn kind(&self) -> BackendKind {
        BackendKind::NetworkManager
    }

    fn host(&self) -> &dyn HostOps {
        self.host
    }

    fn stored_prefix(
        &self,
        iface_name: &str,
    ) -> Result<Option<u8>, SetIpError> {
        Ok(match find_profile(self.host, iface_name)? {
            Some(name) => {
                stored_address(self.host, &name)?.map(|a| a.prefix_length)
            }
            None => None,
        })
    }

    fn apply(
        &self,
        intent: &NetworkIntent,
        mode: Mode,
        _current: &CurrentNetworkState,
    ) -> Result<(), SetIpError> {
        let conn_name = match find_profile(self.host, &intent.interface)? {
            Some(n) => n,
            None => create_profile(self.host, &intent.interface)?,
        };
        let stored = stored_address(self.host, &conn_name)?;
        let prefix_length =
            effective_prefix(intent, stored.map(|a| a.prefix_length))?;

        let mut settings: Vec<(&str, String)> = Vec::new();
        // Manual method without any address is refused by NetworkManager,
        // DHCP profile only changing DNS keeps its method.
        if intent.ip.is_some() || stored.is_some() {
            settings.push(("ipv4.method", "manual".to_string()));
        }
        if let (Some(ip), Some(prefix_length)) = (intent.ip, prefix_length) {
            settings
                .push(("ipv4.addresses", format!("{ip}/{prefix_length}")));
        }
        if let Some(gateway) = intent.gateway {
            settings.push(("ipv4.gateway", gateway.to_string()));
        }
        if let Some(dns) = intent.dns {
            settings.push(("ipv4.dns", dns.to_string()));
        }
        if mode == Mode::DnsOnly {
            settings.push(("ipv4.ignore-auto-dns", "yes".to_string()));
        }
        if settings.is_empty() {
            log::info!("Nothing to change in connection {}", conn_name);
            return Ok(());
        }

        let mut args = vec!["connection", "modify", conn_name.as_str()];
        for (key, value) in settings.iter() {
            args.push(*key);
            args.push(value.as_str());
        }
        run_checked(self.host, NM_CLI, &args)?;
        log::info!("Modified connection {}", conn_name);

        match self
            .host
            .run(NM_CLI, &["connection", "down", conn_name.as_str()])
        {
            Ok(o) if !o.success => log::warn!(
                "Ignoring failure of deactivating {}: {}",
                conn_name,
                o.stderr.trim()
            ),
            Err(e) => log::warn!(
                "Ignoring failure of deactivating {}: {}",
                conn_name,
                e
            ),
            _ => (),
        }
        run_checked(
            self.host,
            NM_CLI,
            &["connection", "up", conn_name.as_str()],
        )?;
        log::info!("Activated connection {}", conn_name);
        Ok(())
    }
}
