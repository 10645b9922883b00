// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use crate::Ipv4AddrInfo;

pub(crate) fn np_ipv4_to_setip(
    np_iface: &nispor::Iface,
) -> Vec<Ipv4AddrInfo> {
    let mut ret = Vec::new();
    if let Some(np_ip) = &np_iface.ipv4 {
        for np_addr in &np_ip.addresses {
            match std::net::Ipv4Addr::from_str(np_addr.address.as_str()) {
                Ok(i) => ret.push(Ipv4AddrInfo::new(i, np_addr.prefix_len)),
                Err(e) => {
                    log::warn!(
                        "BUG: nispor got invalid IPv4 address {}, error {}",
                        np_addr.address.as_str(),
                        e
                    );
                }
            }
        }
    }
    ret
}
