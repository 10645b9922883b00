// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use crate::RouteInfo;

const IPV4_DEFAULT_GATEWAY: &str = "0.0.0.0/0";

pub(crate) fn np_routes_to_setip(
    np_routes: &[nispor::Route],
) -> Vec<RouteInfo> {
    np_routes
        .iter()
        .filter(|r| {
            matches!(r.address_family, nispor::AddressFamily::IPv4)
        })
        .map(np_route_to_setip)
        .collect()
}

fn np_route_to_setip(np_route: &nispor::Route) -> RouteInfo {
    let destination = match np_route.dst.as_deref() {
        Some(IPV4_DEFAULT_GATEWAY) | None => None,
        Some(dst) => Some(dst.to_string()),
    };
    let gateway = np_route
        .gateway
        .as_deref()
        .or(np_route.via.as_deref())
        .and_then(|g| std::net::Ipv4Addr::from_str(g).ok());

    RouteInfo {
        destination,
        gateway,
        oif: np_route.oif.clone(),
    }
}
