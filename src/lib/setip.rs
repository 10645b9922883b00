// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use serde::Serialize;

use crate::{
    intent::resolve_args,
    os::detect_os,
    probe::{current_state, detect_backend, list_interfaces},
    verify::{live_state, LiveState},
    BackendKind, ErrorKind, HostOps, IfcfgBackend, InterfaceSelector, Mode,
    NetplanBackend, NetworkBackend, NetworkIntent, NmBackend, OsInfo,
    SetIpError, VerifyOptions,
};

const DEFAULT_NETPLAN_DIR: &str = "/etc/netplan";
const DEFAULT_NETWORK_SCRIPTS_DIR: &str = "/etc/sysconfig/network-scripts";

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SetIpOptions {
    pub netplan_dir: PathBuf,
    pub network_scripts_dir: PathBuf,
    /// Skip verification when set to `None`.
    pub verify: Option<VerifyOptions>,
}

impl Default for SetIpOptions {
    fn default() -> Self {
        Self {
            netplan_dir: PathBuf::from(DEFAULT_NETPLAN_DIR),
            network_scripts_dir: PathBuf::from(DEFAULT_NETWORK_SCRIPTS_DIR),
            verify: Some(VerifyOptions::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
/// Host facts probed once per run.
pub struct Environment {
    pub os: OsInfo,
    pub backend: BackendKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct InterfaceSummary {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mac_address: String,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
/// Output of [SetIp::show].
pub struct ProbeReport {
    pub os: OsInfo,
    pub backend: BackendKind,
    pub interfaces: Vec<InterfaceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
/// Output of [SetIp::run].
pub struct ApplyReport {
    pub interface: String,
    pub backend: BackendKind,
    pub mode: Mode,
    pub applied: NetworkIntent,
    pub verified: bool,
    pub current: LiveState,
}

/// Entry point: probe host, resolve arguments, apply through the detected
/// backend and verify.
pub struct SetIp<'a> {
    host: &'a dyn HostOps,
    opts: SetIpOptions,
}

impl<'a> SetIp<'a> {
    pub fn new(host: &'a dyn HostOps, opts: SetIpOptions) -> Self {
        Self { host, opts }
    }

    pub fn probe(&self) -> Result<Environment, SetIpError> {
        let os = detect_os(self.host)?;
        let backend = detect_backend(
            &os,
            self.host,
            &self.opts.netplan_dir,
            &self.opts.network_scripts_dir,
        )?;
        Ok(Environment { os, backend })
    }

    pub fn backend(&self, kind: BackendKind) -> Box<dyn NetworkBackend + 'a> {
        match kind {
            BackendKind::NetworkManager => Box::new(NmBackend::new(self.host)),
            BackendKind::Netplan => Box::new(NetplanBackend::new(
                self.host,
                &self.opts.netplan_dir,
            )),
            BackendKind::LegacyScripts => Box::new(IfcfgBackend::new(
                self.host,
                &self.opts.network_scripts_dir,
            )),
        }
    }

    /// Detected OS, backend and configurable interfaces. Changes nothing.
    pub fn show(&self) -> Result<ProbeReport, SetIpError> {
        let env = self.probe()?;
        let state = self.host.retrieve_kernel_state()?;
        Ok(ProbeReport {
            os: env.os,
            backend: env.backend,
            interfaces: list_interfaces(&state)
                .into_iter()
                .map(|i| InterfaceSummary {
                    addresses: i
                        .ipv4_addresses
                        .iter()
                        .map(|a| a.to_string())
                        .collect(),
                    name: i.name,
                    mac_address: i.mac_address,
                })
                .collect(),
        })
    }

    pub fn run<S: AsRef<str>>(
        &self,
        args: &[S],
        selector: &dyn InterfaceSelector,
    ) -> Result<ApplyReport, SetIpError> {
        let (mode, resolved) = resolve_args(args)?;
        let env = self.probe()?;

        let state = self.host.retrieve_kernel_state()?;
        let candidates = list_interfaces(&state);
        if candidates.is_empty() {
            return Err(SetIpError::new(
                ErrorKind::InvalidArgument,
                "No configurable network interface found".to_string(),
            ));
        }
        let iface_name = selector.select(&candidates)?;
        log::info!("Configuring interface {}", iface_name);

        let current = current_state(self.host, &state, &iface_name);
        let mut intent =
            NetworkIntent::new(&iface_name, mode, &resolved, &current);

        let backend = self.backend(env.backend);
        let stored_prefix =
            if intent.ip.is_some() && intent.prefix_length.is_none() {
                backend.stored_prefix(&iface_name)?
            } else {
                None
            };
        intent.validate(stored_prefix)?;
        if intent.prefix_length.is_none() {
            intent.prefix_length = stored_prefix;
        }

        if !self.host.is_root() {
            let e = SetIpError::new(
                ErrorKind::PermissionError,
                "Root privilege is required for changing network \
                configuration"
                    .to_string(),
            );
            log::error!("{}", e);
            return Err(e);
        }

        log::info!(
            "Applying {} via {}: {:?}",
            mode,
            backend.kind(),
            intent
        );
        backend.apply(&intent, mode, &current)?;

        let verified = if let Some(verify_opts) = self.opts.verify.as_ref() {
            backend.verify(&intent, verify_opts)?;
            intent.ip.is_some()
        } else {
            log::info!("Verification disabled");
            false
        };

        Ok(ApplyReport {
            interface: iface_name.clone(),
            backend: backend.kind(),
            mode,
            applied: intent,
            verified,
            current: live_state(self.host, &iface_name)?,
        })
    }
}
