// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::{
    verify::wait_ip_bound, CurrentNetworkState, HostOps, Mode, NetworkIntent,
    SetIpError, VerifyOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
/// Network configuration backend owning the persistent configuration of
/// the host.
pub enum BackendKind {
    NetworkManager,
    Netplan,
    LegacyScripts,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::NetworkManager => "NetworkManager",
                Self::Netplan => "netplan",
                Self::LegacyScripts => "network-scripts",
            }
        )
    }
}

/// Common contract of the backends. A `None` field in [NetworkIntent]
/// means leaving that setting as currently configured.
pub trait NetworkBackend {
    fn kind(&self) -> BackendKind;

    fn host(&self) -> &dyn HostOps;

    /// Prefix length stored in backend configuration of the interface, used
    /// when neither user nor kernel provides one.
    fn stored_prefix(
        &self,
        _iface_name: &str,
    ) -> Result<Option<u8>, SetIpError> {
        Ok(None)
    }

    /// Store the intent into persistent configuration and apply it to the
    /// running system.
    fn apply(
        &self,
        intent: &NetworkIntent,
        mode: Mode,
        current: &CurrentNetworkState,
    ) -> Result<(), SetIpError>;

    /// Wait for kernel to show the new IP address.
    fn verify(
        &self,
        intent: &NetworkIntent,
        opts: &VerifyOptions,
    ) -> Result<(), SetIpError> {
        wait_ip_bound(self.host(), intent, opts)
    }
}

/// Pick the prefix length used for applying: the one in intent, then the
/// one backend or kernel holds.
pub(crate) fn effective_prefix(
    intent: &NetworkIntent,
    fallback: Option<u8>,
) -> Result<Option<u8>, SetIpError> {
    if intent.ip.is_none() {
        return Ok(intent.prefix_length);
    }
    match intent.prefix_length.or(fallback) {
        Some(p) => Ok(Some(p)),
        None => Err(crate::intent::missing_prefix_error(intent)),
    }
}
