// SPDX-License-Identifier: Apache-2.0

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::{
    ip::{mask_to_prefix, parse_ipv4},
    CurrentNetworkState, ErrorKind, SetIpError,
};

pub const USAGE: &str = "Usage: setipctl [IP] [MASK|PREFIX] [GATEWAY] [DNS] \
    or setipctl dns <DNS>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
/// Which settings the user asked to change, decided by argument count.
pub enum Mode {
    IpOnly,
    IpMask,
    DnsOnly,
    IpMaskGw,
    IpMaskGwDns,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::IpOnly => "ip_only",
                Self::IpMask => "ip_mask",
                Self::DnsOnly => "dns_only",
                Self::IpMaskGw => "ip_mask_gw",
                Self::IpMaskGwDns => "ip_mask_gw_dns",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
/// Validated user arguments before the interface is known.
pub struct ResolvedArgs {
    pub ip: Option<Ipv4Addr>,
    pub prefix_length: Option<u8>,
    pub gateway: Option<Ipv4Addr>,
    pub dns: Option<Ipv4Addr>,
}

/// Map 1 to 4 positional arguments to [Mode] and validated settings.
pub fn resolve_args<S: AsRef<str>>(
    args: &[S],
) -> Result<(Mode, ResolvedArgs), SetIpError> {
    let args: Vec<&str> = args.iter().map(|a| a.as_ref().trim()).collect();
    let mut ret = ResolvedArgs::default();
    let mode = match args.as_slice() {
        [ip] => {
            ret.ip = Some(parse_field("IP address", ip)?);
            Mode::IpOnly
        }
        [first, dns] if first.eq_ignore_ascii_case("dns") => {
            ret.dns = Some(parse_field("DNS server", dns)?);
            Mode::DnsOnly
        }
        [ip, mask] => {
            ret.ip = Some(parse_field("IP address", ip)?);
            ret.prefix_length = Some(mask_to_prefix(mask)?);
            Mode::IpMask
        }
        [ip, mask, gateway] => {
            ret.ip = Some(parse_field("IP address", ip)?);
            ret.prefix_length = Some(mask_to_prefix(mask)?);
            ret.gateway = Some(parse_field("gateway", gateway)?);
            Mode::IpMaskGw
        }
        [ip, mask, gateway, dns] => {
            ret.ip = Some(parse_field("IP address", ip)?);
            ret.prefix_length = Some(mask_to_prefix(mask)?);
            ret.gateway = Some(parse_field("gateway", gateway)?);
            ret.dns = Some(parse_field("DNS server", dns)?);
            Mode::IpMaskGwDns
        }
        _ => {
            return Err(SetIpError::new(
                ErrorKind::InvalidArgument,
                format!(
                    "Expecting 1 to 4 arguments, got {}. {USAGE}",
                    args.len()
                ),
            ));
        }
    };
    log::debug!("Arguments resolved to mode {}: {:?}", mode, ret);
    Ok((mode, ret))
}

fn parse_field(field: &str, value: &str) -> Result<Ipv4Addr, SetIpError> {
    parse_ipv4(value).ok_or_else(|| {
        let e = SetIpError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid {field}: {value}"),
        );
        log::error!("{}", e);
        e
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
/// Desired IPv4 settings of one interface, `None` means unchanged.
pub struct NetworkIntent {
    pub interface: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<Ipv4Addr>,
}

impl NetworkIntent {
    /// Build intent for interface by filling settings user did not mention
    /// with current ones:
    ///  * `ip_only`: prefix length and gateway.
    ///  * `ip_mask`: gateway.
    ///  * all modes: DNS.
    pub fn new(
        interface: &str,
        mode: Mode,
        args: &ResolvedArgs,
        current: &CurrentNetworkState,
    ) -> Self {
        let mut intent = Self {
            interface: interface.to_string(),
            ip: args.ip,
            prefix_length: args.prefix_length,
            gateway: args.gateway,
            dns: args.dns,
        };
        match mode {
            Mode::IpOnly => {
                if intent.prefix_length.is_none() {
                    intent.prefix_length = current.prefix_length;
                }
                if intent.gateway.is_none() {
                    intent.gateway = current.gateway;
                }
            }
            Mode::IpMask => {
                if intent.gateway.is_none() {
                    intent.gateway = current.gateway;
                }
            }
            _ => (),
        }
        if intent.dns.is_none() {
            intent.dns = current.dns;
        }
        log::debug!("Gap filled intent: {:?}", intent);
        intent
    }

    /// Reject IP address without any prefix length known.
    pub fn validate(
        &self,
        stored_prefix: Option<u8>,
    ) -> Result<(), SetIpError> {
        if self.ip.is_some()
            && self.prefix_length.is_none()
            && stored_prefix.is_none()
        {
            let e = missing_prefix_error(self);
            log::error!("{}", e);
            Err(e)
        } else {
            Ok(())
        }
    }
}

pub(crate) fn missing_prefix_error(intent: &NetworkIntent) -> SetIpError {
    SetIpError::new(
        ErrorKind::MissingPrefix,
        format!(
            "No netmask specified for {} and interface {} has no \
            existing netmask, please specify one",
            intent.ip.map(|i| i.to_string()).unwrap_or_default(),
            intent.interface
        ),
    )
}
