// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use crate::{
    netplan::conf::NetplanConf, unit_tests::testlib::FakeHost,
    CurrentNetworkState, ErrorKind, Mode, NetplanBackend, NetworkBackend,
    NetworkIntent,
};

const NETPLAN_DIR: &str = "/etc/netplan";
const OVERRIDE_PATH: &str = "/etc/netplan/99-setip-eth0.yaml";
const CLOUD_INIT_CONF: &str = r#"network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
"#;

fn new_host() -> FakeHost {
    let host = FakeHost::ubuntu();
    host.add_dir(NETPLAN_DIR);
    host.add_file("/etc/netplan/50-cloud-init.yaml", CLOUD_INIT_CONF);
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

fn load_yaml(content: &str) -> serde_yaml::Value {
    serde_yaml::from_str(content).unwrap()
}

#[test]
fn test_netplan_write_override() {
    let host = new_host();
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(
        Some("10.0.0.5"),
        Some(24),
        Some("10.0.0.1"),
        Some("1.1.1.1"),
    );
    backend
        .apply(&intent, Mode::IpMaskGwDns, &CurrentNetworkState::default())
        .unwrap();

    let content = host.file(OVERRIDE_PATH).unwrap();
    assert_eq!(
        load_yaml(&content),
        load_yaml(
            r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: false
      addresses:
      - 10.0.0.5/24
      routes:
      - to: 0.0.0.0/0
        via: 10.0.0.1
      nameservers:
        addresses:
        - 1.1.1.1
"#
        )
    );
    assert_eq!(host.file_mode(OVERRIDE_PATH), Some(0o600));
    assert_eq!(host.commands(), vec!["netplan apply".to_string()]);
    // Distribution file is left untouched
    assert_eq!(
        host.file("/etc/netplan/50-cloud-init.yaml").as_deref(),
        Some(CLOUD_INIT_CONF)
    );
}

#[test]
fn test_netplan_backup_existing_files() {
    let host = new_host();
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap();

    let backups: Vec<String> = host
        .file_names()
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .filter(|n| n.ends_with(".bak"))
        .map(|n| n.to_string())
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("50-cloud-init.yaml.setip-"));
    // setip-YYYYmmddHHMMSS.bak
    assert_eq!(
        backups[0].len(),
        "50-cloud-init.yaml.setip-".len() + 14 + ".bak".len()
    );
    let backup_path = format!("{NETPLAN_DIR}/{}", backups[0]);
    assert_eq!(host.file(&backup_path).as_deref(), Some(CLOUD_INIT_CONF));
}

#[test]
fn test_netplan_only_supplied_blocks() {
    let host = new_host();
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(None, None, None, Some("8.8.8.8"));
    backend
        .apply(&intent, Mode::DnsOnly, &CurrentNetworkState::default())
        .unwrap();

    let conf: NetplanConf =
        serde_yaml::from_str(&host.file(OVERRIDE_PATH).unwrap()).unwrap();
    let eth0 = &conf.network.ethernets["eth0"];
    assert_eq!(eth0.dhcp4, None);
    assert_eq!(eth0.addresses, None);
    assert_eq!(eth0.routes, None);
    assert_eq!(
        eth0.nameservers.as_ref().map(|n| n.addresses.clone()),
        Some(vec!["8.8.8.8".to_string()])
    );
}

#[test]
fn test_netplan_merge_existing_override() {
    let host = new_host();
    host.add_file(
        OVERRIDE_PATH,
        r#"network:
  version: 2
  renderer: networkd
  ethernets:
    eth0:
      dhcp4: false
      mtu: 9000
      addresses:
      - 10.0.0.5/24
      routes:
      - to: 0.0.0.0/0
        via: 10.0.0.1
      - to: 10.1.0.0/16
        via: 10.0.0.254
      nameservers:
        addresses:
        - 10.0.0.53
        search:
        - example.com
"#,
    );
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(
        Some("10.0.0.6"),
        Some(24),
        Some("10.0.0.2"),
        Some("8.8.8.8"),
    );
    backend
        .apply(&intent, Mode::IpMaskGwDns, &CurrentNetworkState::default())
        .unwrap();

    assert_eq!(
        load_yaml(&host.file(OVERRIDE_PATH).unwrap()),
        load_yaml(
            r#"
network:
  version: 2
  renderer: networkd
  ethernets:
    eth0:
      dhcp4: false
      addresses:
      - 10.0.0.6/24
      routes:
      - to: 10.1.0.0/16
        via: 10.0.0.254
      - to: 0.0.0.0/0
        via: 10.0.0.2
      nameservers:
        addresses:
        - 8.8.8.8
        search:
        - example.com
      mtu: 9000
"#
        )
    );
}

#[test]
fn test_netplan_discard_invalid_override() {
    let host = new_host();
    host.add_file(OVERRIDE_PATH, "network: [not, a, mapping]\n");
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap();

    let conf: NetplanConf =
        serde_yaml::from_str(&host.file(OVERRIDE_PATH).unwrap()).unwrap();
    assert_eq!(
        conf.network.ethernets["eth0"].addresses,
        Some(vec!["10.0.0.5/24".to_string()])
    );
}

#[test]
fn test_netplan_use_current_prefix() {
    let host = new_host();
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(Some("10.0.0.5"), None, None, None);
    backend
        .apply(
            &intent,
            Mode::IpOnly,
            &CurrentNetworkState::new(Some(22), None, None),
        )
        .unwrap();

    let conf: NetplanConf =
        serde_yaml::from_str(&host.file(OVERRIDE_PATH).unwrap()).unwrap();
    assert_eq!(
        conf.network.ethernets["eth0"].addresses,
        Some(vec!["10.0.0.5/22".to_string()])
    );
}

#[test]
fn test_netplan_missing_prefix_change_nothing() {
    let host = new_host();
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(Some("10.0.0.5"), None, None, None);
    let e = backend
        .apply(&intent, Mode::IpOnly, &CurrentNetworkState::default())
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::MissingPrefix);
    assert!(host.written().is_empty());
    assert!(host.commands().is_empty());
}

#[test]
fn test_netplan_apply_failure() {
    let host = new_host();
    host.set_output("netplan apply", false, "Invalid YAML");
    let backend = NetplanBackend::new(&host, Path::new(NETPLAN_DIR));
    let intent = new_intent(Some("10.0.0.5"), Some(24), None, None);
    let e = backend
        .apply(&intent, Mode::IpMask, &CurrentNetworkState::default())
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ApplyError);
    assert!(host.file(OVERRIDE_PATH).is_some());
}
