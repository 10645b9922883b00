// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use crate::{
    ifcfg::file::IfcfgFile, unit_tests::testlib::FakeHost,
    CurrentNetworkState, ErrorKind, IfcfgBackend, Mode, NetworkBackend,
    NetworkIntent,
};

const SCRIPTS_DIR: &str = "/etc/sysconfig/network-scripts";
const IFCFG_PATH: &str = "/etc/sysconfig/network-scripts/ifcfg-eth0";

fn new_host() -> FakeHost {
    let host = FakeHost::centos();
    host.add_dir(SCRIPTS_DIR);
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
fn test_ifcfg_create_new_file() {
    let host = new_host();
    let backend = IfcfgBackend::new(&host, Path::new(SCRIPTS_DIR));
    let intent = new_intent(
        Some("192.168.1.50"),
        Some(24),
        Some("192.168.1.1"),
        None,
    );
    backend
        .apply(&intent, Mode::IpMaskGw, &CurrentNetworkState::default())
        .unwrap();

    assert_eq!(
        host.file(IFCFG_PATH).unwrap(),
        "DEVICE=eth0\nBOOTPROTO=none\nONBOOT=yes\nIPADDR=192.168.1.50\n\
        NETMASK=255.255.255.0\nGATEWAY=192.168.1.1\n"
    );
    assert_eq!(host.file_mode(IFCFG_PATH), Some(0o644));
    assert_eq!(host.commands(), vec!["systemctl restart network".to_string()]);
}

#[test]
fn test_ifcfg_replace_existing_entries() {
    let host = new_host();
    host.add_file(
        IFCFG_PATH,
        "# Generated by installer\nTYPE=Ethernet\nDEVICE=eth0\n\
        BOOTPROTO=\"dhcp\"\nIPADDR=10.0.0.2\nPREFIX=8\nGATEWAY=10.0.0.1\n\
        DNS1=10.0.0.53\nDNS2=10.0.0.54\nONBOOT=yes\n",
    );
    let backend = IfcfgBackend::new(&host, Path::new(SCRIPTS_DIR));
    let intent = new_intent(
        Some("192.168.1.50"),
        Some(22),
        Some("192.168.1.1"),
        Some("192.168.1.53"),
    );
    backend
        .apply(&intent, Mode::IpMaskGwDns, &CurrentNetworkState::default())
        .unwrap();

    assert_eq!(
        host.file(IFCFG_PATH).unwrap(),
        "# Generated by installer\nTYPE=Ethernet\nDEVICE=eth0\n\
        BOOTPROTO=none\nDNS2=10.0.0.54\nONBOOT=yes\n\
        IPADDR=192.168.1.50\nNETMASK=255.255.252.0\n\
        GATEWAY=192.168.1.1\nDNS1=192.168.1.53\n"
    );
}

#[test]
fn test_ifcfg_dns_only_keep_address() {
    let host = new_host();
    host.add_file(
        IFCFG_PATH,
        "DEVICE=eth0\nBOOTPROTO=dhcp\nONBOOT=yes\nDNS1=10.0.0.53\n",
    );
    let backend = IfcfgBackend::new(&host, Path::new(SCRIPTS_DIR));
    let intent = new_intent(None, None, None, Some("8.8.8.8"));
    backend
        .apply(&intent, Mode::DnsOnly, &CurrentNetworkState::default())
        .unwrap();

    assert_eq!(
        host.file(IFCFG_PATH).unwrap(),
        "DEVICE=eth0\nBOOTPROTO=dhcp\nONBOOT=yes\nDNS1=8.8.8.8\n"
    );
}

#[test]
fn test_ifcfg_use_current_prefix() {
    let host = new_host();
    let backend = IfcfgBackend::new(&host, Path::new(SCRIPTS_DIR));
    let intent = new_intent(Some("192.168.1.50"), None, None, None);
    backend
        .apply(
            &intent,
            Mode::IpOnly,
            &CurrentNetworkState::new(Some(16), None, None),
        )
        .unwrap();

    let ifcfg = IfcfgFile::parse(&host.file(IFCFG_PATH).unwrap());
    assert_eq!(ifcfg.get("NETMASK"), Some("255.255.0.0"));
}

#[test]
fn test_ifcfg_missing_prefix_change_nothing() {
    let host = new_host();
    let backend = IfcfgBackend::new(&host, Path::new(SCRIPTS_DIR));
    let intent = new_intent(Some("192.168.1.50"), None, None, None);
    let e = backend
        .apply(&intent, Mode::IpOnly, &CurrentNetworkState::default())
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::MissingPrefix);
    assert!(host.written().is_empty());
    assert!(host.commands().is_empty());
}

#[test]
fn test_ifcfg_restart_failure() {
    let host = new_host();
    host.set_output(
        "systemctl restart network",
        false,
        "Job for network.service failed",
    );
    let backend = IfcfgBackend::new(&host, Path::new(SCRIPTS_DIR));
    let intent = new_intent(Some("192.168.1.50"), Some(24), None, None);
    let e = backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ApplyError);
    assert!(e.msg().contains("network.service"));
}

#[test]
fn test_ifcfg_file_keep_unknown_lines() {
    let content = "# comment\n\nexport FOO\nNAME=\"System eth0\"\n";
    let mut ifcfg = IfcfgFile::parse(content);
    assert_eq!(ifcfg.get("NAME"), Some("System eth0"));
    assert_eq!(ifcfg.to_string(), content);

    ifcfg.replace("NAME", "eth0");
    ifcfg.replace("MTU", "9000");
    assert_eq!(
        ifcfg.to_string(),
        "# comment\n\nexport FOO\nNAME=eth0\nMTU=9000\n"
    );
}
