// SPDX-License-Identifier: Apache-2.0

use crate::{
    nm::profile::parse_terse_line, unit_tests::testlib::FakeHost,
    CurrentNetworkState, ErrorKind, Mode, NetworkBackend, NetworkIntent,
    NmBackend,
};

const ACTIVE_CMD: &str =
    "nmcli -t -f NAME,DEVICE connection show --active";
const ALL_CMD: &str = "nmcli -t -f NAME connection show";

fn host_with_active_profile(stored_addrs: &str) -> FakeHost {
    let host = FakeHost::ubuntu();
    host.enable_nm();
    host.set_output(ACTIVE_CMD, true, "Wired connection 1:eth0\nlo:lo\n");
    host.set_output(
        "nmcli -g ipv4.addresses connection show Wired connection 1",
        true,
        stored_addrs,
    );
    host
}

fn new_intent(
    ip: Option<&str>,
    prefix_length: Option<u8>,
    gateway: Option<&str>,
    dns: Option<&str>,
) -> NetworkIntent {
    NetworkIntent {
        interface: "eth0".to_string(),
        ip: ip.map(|i| i.parse().unwrap()),
        prefix_length,
        gateway: gateway.map(|i| i.parse().unwrap()),
        dns: dns.map(|i| i.parse().unwrap()),
    }
}

#[test]
fn test_nm_modify_active_profile() {
    let host = host_with_active_profile("");
    let backend = NmBackend::new(&host);
    let intent = new_intent(
        Some("10.0.0.5"),
        Some(24),
        Some("10.0.0.1"),
        Some("1.1.1.1"),
    );
    backend
        .apply(&intent, Mode::IpMaskGwDns, &CurrentNetworkState::default())
        .unwrap();

    assert_eq!(
        host.commands(),
        vec![
            ACTIVE_CMD.to_string(),
            "nmcli -g ipv4.addresses connection show Wired connection 1"
                .to_string(),
            "nmcli connection modify Wired connection 1 ipv4.method manual \
             ipv4.addresses 10.0.0.5/24 ipv4.gateway 10.0.0.1 \
             ipv4.dns 1.1.1.1"
                .to_string(),
            "nmcli connection down Wired connection 1".to_string(),
            "nmcli connection up Wired connection 1".to_string(),
        ]
    );
}

#[test]
fn test_nm_find_inactive_profile_by_interface_name() {
    let host = FakeHost::ubuntu();
    host.set_output(ACTIVE_CMD, true, "lo:lo\n");
    host.set_output(ALL_CMD, true, "lo\nprofile-eth1\nmy\\:eth0\n");
    host.set_output(
        "nmcli -g connection.interface-name connection show profile-eth1",
        true,
        "eth1\n",
    );
    host.set_output(
        "nmcli -g connection.interface-name connection show my:eth0",
        true,
        "eth0\n",
    );
    let backend = NmBackend::new(&host);
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap();

    assert!(host.has_command(
        "nmcli connection modify my:eth0 ipv4.method manual \
         ipv4.addresses 10.0.0.5/24"
    ));
    assert!(host.has_command("nmcli connection up my:eth0"));
    assert!(!host
        .commands()
        .iter()
        .any(|c| c.starts_with("nmcli connection add")));
}

#[test]
fn test_nm_create_profile_when_none_found() {
    let host = FakeHost::ubuntu();
    let backend = NmBackend::new(&host);
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap();

    assert!(host.has_command(
        "nmcli connection add type ethernet con-name setip-eth0 \
         ifname eth0 autoconnect yes"
    ));
    assert!(host.has_command(
        "nmcli connection modify setip-eth0 ipv4.method manual \
         ipv4.addresses 10.0.0.5/24"
    ));
    assert!(host.has_command("nmcli connection up setip-eth0"));
}

#[test]
fn test_nm_reuse_stored_prefix() {
    let host = host_with_active_profile("192.168.0.5/16, 192.168.1.5/24\n");
    let backend = NmBackend::new(&host);
    assert_eq!(backend.stored_prefix("eth0").unwrap(), Some(16));

    let intent = new_intent(Some("10.0.0.5"), None, None, None);
    backend
        .apply(&intent, Mode::IpOnly, &CurrentNetworkState::default())
        .unwrap();
    assert!(host.has_command(
        "nmcli connection modify Wired connection 1 ipv4.method manual \
         ipv4.addresses 10.0.0.5/16"
    ));
}

#[test]
fn test_nm_missing_prefix() {
    let host = host_with_active_profile("");
    let backend = NmBackend::new(&host);
    assert_eq!(backend.stored_prefix("eth0").unwrap(), None);

    let intent = new_intent(Some("10.0.0.5"), None, None, None);
    let e = backend
        .apply(&intent, Mode::IpOnly, &CurrentNetworkState::default())
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::MissingPrefix);
    assert!(!host
        .commands()
        .iter()
        .any(|c| c.starts_with("nmcli connection modify")));
}

#[test]
fn test_nm_dns_only_keep_dhcp_method() {
    let host = host_with_active_profile("");
    let backend = NmBackend::new(&host);
    let intent = new_intent(None, None, None, Some("8.8.8.8"));
    backend
        .apply(&intent, Mode::DnsOnly, &CurrentNetworkState::default())
        .unwrap();
    assert!(host.has_command(
        "nmcli connection modify Wired connection 1 ipv4.dns 8.8.8.8 \
         ipv4.ignore-auto-dns yes"
    ));
}

#[test]
fn test_nm_dns_only_on_static_profile() {
    let host = host_with_active_profile("10.0.0.5/24\n");
    let backend = NmBackend::new(&host);
    let intent = new_intent(None, None, None, Some("8.8.8.8"));
    backend
        .apply(&intent, Mode::DnsOnly, &CurrentNetworkState::default())
        .unwrap();
    assert!(host.has_command(
        "nmcli connection modify Wired connection 1 ipv4.method manual \
         ipv4.dns 8.8.8.8 ipv4.ignore-auto-dns yes"
    ));
}

#[test]
fn test_nm_ignore_down_failure() {
    let host = host_with_active_profile("");
    host.set_output(
        "nmcli connection down Wired connection 1",
        false,
        "Error: not an active connection",
    );
    let backend = NmBackend::new(&host);
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap();
    assert!(host.has_command("nmcli connection up Wired connection 1"));
}

#[test]
fn test_nm_up_failure() {
    let host = host_with_active_profile("");
    host.set_output(
        "nmcli connection up Wired connection 1",
        false,
        "Error: Connection activation failed",
    );
    let backend = NmBackend::new(&host);
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    let e = backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ApplyError);
    assert!(e.msg().contains("Connection activation failed"));
}

#[test]
fn test_nm_modify_failure() {
    let host = host_with_active_profile("");
    host.set_output(
        "nmcli connection modify Wired connection 1 ipv4.method manual \
         ipv4.addresses 10.0.0.5/24",
        false,
        "Error: invalid IP address",
    );
    let backend = NmBackend::new(&host);
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    let e = backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ApplyError);
    assert!(!host.has_command("nmcli connection up Wired connection 1"));
}

#[test]
fn test_parse_terse_line_escape() {
    assert_eq!(
        parse_terse_line("my\\:conn:eth0"),
        vec!["my:conn".to_string(), "eth0".to_string()]
    );
    assert_eq!(
        parse_terse_line("back\\\\slash:"),
        vec!["back\\slash".to_string(), String::new()]
    );
}
