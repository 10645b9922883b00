// SPDX-License-Identifier: Apache-2.0

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Serialize;

use crate::{
    ip::prefix_to_mask, probe::current_dns, ErrorKind, HostOps, Ipv4AddrInfo,
    NetworkIntent, SetIpError,
};

const DEFAULT_VERIFY_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_VERIFY_INTERVAL_MILLISECONDS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct VerifyOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECONDS),
            interval: Duration::from_millis(
                DEFAULT_VERIFY_INTERVAL_MILLISECONDS,
            ),
        }
    }
}

impl VerifyOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    fn retry_count(&self) -> usize {
        let interval_ms = self.interval.as_millis().max(1);
        (self.timeout.as_millis() / interval_ms) as usize + 1
    }
}

/// Poll kernel until the IP address of intent shows up on the interface.
/// Nothing to wait for when intent holds no IP address.
pub(crate) fn wait_ip_bound(
    host: &dyn HostOps,
    intent: &NetworkIntent,
    opts: &VerifyOptions,
) -> Result<(), SetIpError> {
    let ip = match intent.ip {
        Some(i) => i,
        None => return Ok(()),
    };
    with_retry(host, opts.interval, opts.retry_count(), || {
        verify_ip_bound(host, &intent.interface, ip, intent.prefix_length)
    })?;
    log::info!("Verified {} is bound to {}", ip, intent.interface);
    Ok(())
}

fn verify_ip_bound(
    host: &dyn HostOps,
    iface_name: &str,
    ip: Ipv4Addr,
    prefix_length: Option<u8>,
) -> Result<(), SetIpError> {
    let state = host.retrieve_kernel_state()?;
    let found = state.get_iface(iface_name).map(|iface| {
        iface.ipv4_addresses.iter().any(|a| {
            a.ip == ip
                && prefix_length.map(|p| p == a.prefix_length).unwrap_or(true)
        })
    });
    match found {
        Some(true) => Ok(()),
        Some(false) => Err(SetIpError::new(
            ErrorKind::VerificationFailed,
            format!(
                "IP address {}{} is not bound to interface {}",
                ip,
                prefix_length.map(|p| format!("/{p}")).unwrap_or_default(),
                iface_name
            ),
        )),
        None => Err(SetIpError::new(
            ErrorKind::VerificationFailed,
            format!("Interface {iface_name} not found in kernel"),
        )),
    }
}

fn with_retry<T>(
    host: &dyn HostOps,
    interval: Duration,
    count: usize,
    func: T,
) -> Result<(), SetIpError>
where
    T: Fn() -> Result<(), SetIpError>,
{
    let mut cur_count = 0usize;
    while cur_count < count {
        if let Err(e) = func() {
            if cur_count == count - 1 || !e.kind().can_retry() {
                log::error!("{}", e);
                return Err(e);
            } else {
                log::debug!("Retrying on: {}", e);
                host.sleep(interval);
                cur_count += 1;
                continue;
            }
        } else {
            return Ok(());
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
/// Network settings of interface as seen after applying.
pub struct LiveState {
    pub addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<Ipv4Addr>,
}

/// Re-read address, netmask, default gateway and DNS of interface.
pub fn live_state(
    host: &dyn HostOps,
    iface_name: &str,
) -> Result<LiveState, SetIpError> {
    let state = host.retrieve_kernel_state()?;
    let addrs: Vec<Ipv4AddrInfo> = state
        .get_iface(iface_name)
        .map(|i| i.ipv4_addresses.clone())
        .unwrap_or_default();
    Ok(LiveState {
        addresses: addrs.iter().map(|a| a.to_string()).collect(),
        netmask: addrs.first().map(|a| prefix_to_mask(a.prefix_length)),
        gateway: state.current_gateway(iface_name),
        dns: current_dns(host),
    })
}
