// SPDX-License-Identifier: Apache-2.0

use log::debug;

use crate::{
    nispor::{ip::np_ipv4_to_setip, route::np_routes_to_setip},
    ErrorKind, InterfaceInfo, KernelState, SetIpError,
};

pub(crate) fn nispor_retrieve() -> Result<KernelState, SetIpError> {
    let mut state = KernelState::new();
    let np_state = nispor::NetState::retrieve().map_err(|e| {
        SetIpError::new(
            ErrorKind::Bug,
            format!("Failed to retrieve kernel network state: {e}"),
        )
    })?;

    for np_iface in np_state.ifaces.values() {
        let iface = InterfaceInfo {
            name: np_iface.name.to_string(),
            is_loopback: matches!(
                np_iface.iface_type,
                nispor::IfaceType::Loopback
            ),
            mac_address: np_iface.mac_address.to_uppercase(),
            ipv4_addresses: np_ipv4_to_setip(np_iface),
        };
        debug!("Got interface {:?}", iface);
        state.interfaces.push(iface);
    }
    state.interfaces.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    state.routes = np_routes_to_setip(&np_state.routes);

    Ok(state)
}
