// SPDX-License-Identifier: Apache-2.0

use std::net::Ipv4Addr;

use crate::{ErrorKind, SetIpError};

const IPV4_ADDR_LEN: u8 = 32;

// Octet value of a netmask and the number of leading one bits it holds.
const MASK_OCTET_BITS: [(u8, u8); 9] = [
    (0, 0),
    (128, 1),
    (192, 2),
    (224, 3),
    (240, 4),
    (248, 5),
    (252, 6),
    (254, 7),
    (255, 8),
];

/// Parse dotted-quad IPv4 address. Every octet must be 1 to 3 ASCII digits
/// holding a value between 0 and 255.
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    let octets = parse_quad(s)?;
    Some(Ipv4Addr::from(octets))
}

pub fn is_valid_ipv4(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

pub fn is_valid_prefix(prefix_length: u32) -> bool {
    (1..=IPV4_ADDR_LEN as u32).contains(&prefix_length)
}

/// Convert netmask or prefix length string to prefix length.
///
/// When `mask_or_prefix` is already a valid prefix length(1-32) it is
/// returned as it is. Otherwise it is parsed as dotted netmask where every
/// octet should be one of the canonical mask octet values. The order of the
/// octets is not checked: `255.0.255.0` is treated as prefix 16 with a
/// warning logged.
pub fn mask_to_prefix(mask_or_prefix: &str) -> Result<u8, SetIpError> {
    let mask_or_prefix = mask_or_prefix.trim();
    if let Ok(prefix_length) = mask_or_prefix.parse::<u32>() {
        if is_valid_prefix(prefix_length) {
            return Ok(prefix_length as u8);
        }
    }

    let octets = parse_quad(mask_or_prefix).ok_or_else(|| {
        SetIpError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid netmask or prefix length: {mask_or_prefix}"),
        )
    })?;

    let mut prefix_length = 0u8;
    for octet in octets {
        match MASK_OCTET_BITS.iter().find(|(v, _)| *v == octet) {
            Some((_, bits)) => prefix_length += bits,
            None => {
                let e = SetIpError::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "Invalid netmask {mask_or_prefix}: octet {octet} \
                        is not a valid netmask octet"
                    ),
                );
                log::error!("{}", e);
                return Err(e);
            }
        }
    }

    if !is_valid_prefix(prefix_length as u32) {
        return Err(SetIpError::new(
            ErrorKind::InvalidArgument,
            format!(
                "Invalid netmask {mask_or_prefix}: prefix length \
                {prefix_length} is out of range 1-32"
            ),
        ));
    }

    if prefix_to_mask(prefix_length).octets() != octets {
        log::warn!(
            "Netmask {} is not a contiguous netmask, treating it as /{}",
            mask_or_prefix,
            prefix_length
        );
    }
    Ok(prefix_length)
}

/// Expand prefix length to dotted netmask. Prefix length larger than 32 is
/// treated as 32.
pub fn prefix_to_mask(prefix_length: u8) -> Ipv4Addr {
    let prefix_length = prefix_length.min(IPV4_ADDR_LEN);
    if prefix_length == 0 {
        Ipv4Addr::UNSPECIFIED
    } else {
        Ipv4Addr::from(u32::MAX << (IPV4_ADDR_LEN - prefix_length))
    }
}

fn parse_quad(s: &str) -> Option<[u8; 4]> {
    let items: Vec<&str> = s.split('.').collect();
    if items.len() != 4 {
        return None;
    }
    let mut octets = [0u8; 4];
    for (i, item) in items.iter().enumerate() {
        if item.is_empty()
            || item.len() > 3
            || !item.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        octets[i] = item.parse::<u16>().ok().and_then(|d| {
            if d <= u8::MAX as u16 {
                Some(d as u8)
            } else {
                None
            }
        })?;
    }
    Some(octets)
}

/// IPv4 address with prefix length as found in kernel or backend
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Ipv4AddrInfo {
    pub ip: Ipv4Addr,
    pub prefix_length: u8,
}

impl Ipv4AddrInfo {
    pub fn new(ip: Ipv4Addr, prefix_length: u8) -> Self {
        Self { ip, prefix_length }
    }
}

impl std::fmt::Display for Ipv4AddrInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_length)
    }
}

impl std::convert::TryFrom<&str> for Ipv4AddrInfo {
    type Error = SetIpError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut addr: Vec<&str> = value.trim().split('/').collect();
        if addr.len() > 2 {
            return Err(SetIpError::new(
                ErrorKind::InvalidArgument,
                format!("Invalid IPv4 address {value}: too many '/'"),
            ));
        }
        addr.resize(2, "");
        let ip = parse_ipv4(addr[0]).ok_or_else(|| {
            SetIpError::new(
                ErrorKind::InvalidArgument,
                format!("Invalid IPv4 address {}", addr[0]),
            )
        })?;

        let prefix_length = if addr[1].is_empty() {
            IPV4_ADDR_LEN
        } else {
            match addr[1].parse::<u32>() {
                Ok(p) if is_valid_prefix(p) => p as u8,
                _ => {
                    return Err(SetIpError::new(
                        ErrorKind::InvalidArgument,
                        format!("Invalid IPv4 address {value}: bad prefix"),
                    ));
                }
            }
        };
        Ok(Self { ip, prefix_length })
    }
}
