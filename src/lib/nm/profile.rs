// SPDX-License-Identifier: Apache-2.0

use std::convert::TryFrom;

use crate::{host::run_checked, HostOps, Ipv4AddrInfo, SetIpError};

pub(crate) const NM_CLI: &str = "nmcli";
pub(crate) const CONN_NAME_PREFIX: &str = "setip-";

/// Name of the connection profile bound to interface. Active connection on
/// the device is preferred over inactive profiles holding the interface
/// name.
pub(crate) fn find_profile(
    host: &dyn HostOps,
    iface_name: &str,
) -> Result<Option<String>, SetIpError> {
    let output = run_checked(
        host,
        NM_CLI,
        &["-t", "-f", "NAME,DEVICE", "connection", "show", "--active"],
    )?;
    for line in output.stdout.lines() {
        let fields = parse_terse_line(line);
        if fields.len() == 2 && fields[1] == iface_name {
            log::debug!(
                "Found active connection {} on {}",
                fields[0],
                iface_name
            );
            return Ok(Some(fields[0].clone()));
        }
    }

    let output = run_checked(
        host,
        NM_CLI,
        &["-t", "-f", "NAME", "connection", "show"],
    )?;
    for line in output.stdout.lines() {
        let name = match parse_terse_line(line).into_iter().next() {
            Some(n) if !n.is_empty() => n,
            _ => continue,
        };
        let output = run_checked(
            host,
            NM_CLI,
            &[
                "-g",
                "connection.interface-name",
                "connection",
                "show",
                name.as_str(),
            ],
        )?;
        if output.stdout.trim() == iface_name {
            log::debug!(
                "Found inactive connection {} for {}",
                name,
                iface_name
            );
            return Ok(Some(name));
        }
    }
    Ok(None)
}

pub(crate) fn create_profile(
    host: &dyn HostOps,
    iface_name: &str,
) -> Result<String, SetIpError> {
    let name = format!("{CONN_NAME_PREFIX}{iface_name}");
    run_checked(
        host,
        NM_CLI,
        &[
            "connection",
            "add",
            "type",
            "ethernet",
            "con-name",
            name.as_str(),
            "ifname",
            iface_name,
            "autoconnect",
            "yes",
        ],
    )?;
    log::info!("Created connection {} for {}", name, iface_name);
    Ok(name)
}

/// First IPv4 address stored in connection profile.
pub(crate) fn stored_address(
    host: &dyn HostOps,
    conn_name: &str,
) -> Result<Option<Ipv4AddrInfo>, SetIpError> {
    let output = run_checked(
        host,
        NM_CLI,
        &["-g", "ipv4.addresses", "connection", "show", conn_name],
    )?;
    Ok(output
        .stdout
        .split(|c| c == ',' || c == '|' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .find_map(|s| match Ipv4AddrInfo::try_from(s) {
            Ok(a) => Some(a),
            Err(e) => {
                log::warn!(
                    "Ignoring invalid address {} of connection {}: {}",
                    s,
                    conn_name,
                    e
                );
                None
            }
        }))
}

// Terse output of nmcli separate fields by ':' and escape literal ':' and
// '\' with '\'.
pub(crate) fn parse_terse_line(line: &str) -> Vec<String> {
    let mut ret = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    field.push(escaped);
                }
            }
            ':' => ret.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    ret.push(field);
    ret
}
