// SPDX-License-Identifier: Apache-2.0

//! Set IPv4 address, prefix length, default gateway and DNS server of a
//! network interface through whichever backend owns the host network
//! configuration: NetworkManager, netplan or legacy network-scripts.

mod backend;
mod error;
mod host;
mod ifcfg;
mod intent;
mod ip;
#[cfg(feature = "query_apply")]
mod nispor;
mod netplan;
mod nm;
mod os;
mod probe;
mod setip;
mod state;
mod verify;


pub use crate::backend::{BackendKind, NetworkBackend};
pub use crate::error::{ErrorKind, SetIpError};
#[cfg(feature = "query_apply")]
pub use crate::host::HostSystem;
pub use crate::host::{CommandOutput, HostOps};
pub use crate::ifcfg::IfcfgBackend;
pub use crate::intent::{resolve_args, Mode, NetworkIntent, ResolvedArgs, USAGE};
pub use crate::ip::{
    is_valid_ipv4, is_valid_prefix, mask_to_prefix, parse_ipv4,
    prefix_to_mask, Ipv4AddrInfo,
};
pub use crate::netplan::NetplanBackend;
pub use crate::nm::NmBackend;
pub use crate::os::{detect_os, OsId, OsInfo, PackageManager};
pub use crate::probe::{
    current_dns, current_state, detect_backend, list_interfaces,
    FixedInterface, InterfaceSelector,
};
pub use crate::setip::{
    ApplyReport, Environment, InterfaceSummary, ProbeReport, SetIp,
    SetIpOptions,
};
pub use crate::state::{
    CurrentNetworkState, InterfaceInfo, KernelState, RouteInfo,
};
pub use crate::verify::{live_state, LiveState, VerifyOptions};
