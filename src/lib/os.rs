// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::{ErrorKind, HostOps, SetIpError};

pub(crate) const OS_RELEASE_PATH: &str = "/etc/os-release";
pub(crate) const REDHAT_RELEASE_PATH: &str = "/etc/redhat-release";

const UBUNTU_MIN_VERSION: (u32, u32) = (18, 4);
const RHEL_MIN_VERSION: (u32, u32) = (7, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OsId {
    Ubuntu,
    Centos,
    Rhel,
}

impl std::fmt::Display for OsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Ubuntu => "ubuntu",
                Self::Centos => "centos",
                Self::Rhel => "rhel",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum PackageManager {
    Apt,
    Yum,
    Dnf,
}

impl PackageManager {
    /// Command line for installing specified package.
    pub fn install_command(&self, package: &str) -> String {
        match self {
            Self::Apt => format!("apt-get install -y {package}"),
            Self::Yum => format!("yum install -y {package}"),
            Self::Dnf => format!("dnf install -y {package}"),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Apt => "apt",
                Self::Yum => "yum",
                Self::Dnf => "dnf",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct OsInfo {
    pub id: OsId,
    pub version_major: u32,
    pub version_minor: u32,
    pub package_manager: PackageManager,
}

impl OsInfo {
    pub fn new(id: OsId, version_major: u32, version_minor: u32) -> Self {
        let package_manager = match id {
            OsId::Ubuntu => PackageManager::Apt,
            OsId::Centos | OsId::Rhel => {
                if version_major >= 8 {
                    PackageManager::Dnf
                } else {
                    PackageManager::Yum
                }
            }
        };
        Self {
            id,
            version_major,
            version_minor,
            package_manager,
        }
    }

    pub fn is_ubuntu(&self) -> bool {
        self.id == OsId::Ubuntu
    }
}

impl std::fmt::Display for OsInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.id == OsId::Ubuntu {
            write!(
                f,
                "{} {}.{:02}",
                self.id, self.version_major, self.version_minor
            )
        } else {
            write!(
                f,
                "{} {}.{}",
                self.id, self.version_major, self.version_minor
            )
        }
    }
}

/// Detect OS identity and check it against the supported version floor:
/// Ubuntu 18.04 or CentOS/RHEL 7.5.
pub fn detect_os(host: &dyn HostOps) -> Result<OsInfo, SetIpError> {
    let content = host.read_file(Path::new(OS_RELEASE_PATH)).map_err(|e| {
        SetIpError::new(
            ErrorKind::UnsupportedPlatform,
            format!("Failed to read {OS_RELEASE_PATH}: {e}"),
        )
    })?;
    let os_release = parse_os_release(&content);

    let id = match os_release.get("ID").map(String::as_str) {
        Some("ubuntu") => OsId::Ubuntu,
        Some("centos") => OsId::Centos,
        Some("rhel") => OsId::Rhel,
        Some(other) => {
            return Err(SetIpError::new(
                ErrorKind::UnsupportedPlatform,
                format!(
                    "Unsupported platform '{other}', only Ubuntu, \
                    CentOS and RHEL are supported"
                ),
            ));
        }
        None => {
            return Err(SetIpError::new(
                ErrorKind::UnsupportedPlatform,
                format!("No ID found in {OS_RELEASE_PATH}"),
            ));
        }
    };

    let version_id = os_release
        .get("VERSION_ID")
        .map(String::as_str)
        .unwrap_or_default();
    let (major, mut minor) = parse_version(version_id).ok_or_else(|| {
        SetIpError::new(
            ErrorKind::UnsupportedPlatform,
            format!("Invalid VERSION_ID '{version_id}' of {id}"),
        )
    })?;

    // CentOS 7 only expose major version in os-release
    if id != OsId::Ubuntu && minor.is_none() {
        minor = read_redhat_release_minor(host);
    }
    let os = OsInfo::new(id, major, minor.unwrap_or_default());

    let floor = match id {
        OsId::Ubuntu => UBUNTU_MIN_VERSION,
        OsId::Centos | OsId::Rhel => RHEL_MIN_VERSION,
    };
    if (os.version_major, os.version_minor) < floor {
        let e = SetIpError::new(
            ErrorKind::UnsupportedPlatform,
            format!(
                "{os} is not supported, minimum supported version is \
                {}.{}",
                floor.0, floor.1
            ),
        );
        log::error!("{}", e);
        return Err(e);
    }
    log::info!("Detected OS {}", os);
    Ok(os)
}

pub(crate) fn parse_os_release(content: &str) -> HashMap<String, String> {
    let mut ret = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            ret.insert(key.trim().to_string(), value.to_string());
        }
    }
    ret
}

fn parse_version(version: &str) -> Option<(u32, Option<u32>)> {
    let mut items = version.trim().split('.');
    let major = items.next()?.parse::<u32>().ok()?;
    let minor = match items.next() {
        Some(m) => Some(m.parse::<u32>().ok()?),
        None => None,
    };
    Some((major, minor))
}

// Content example: `CentOS Linux release 7.9.2009 (Core)`
fn read_redhat_release_minor(host: &dyn HostOps) -> Option<u32> {
    let content = match host.read_file(Path::new(REDHAT_RELEASE_PATH)) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to read {}: {}", REDHAT_RELEASE_PATH, e);
            return None;
        }
    };
    let mut words = content.split_whitespace();
    words.find(|w| *w == "release")?;
    parse_version(words.next()?).and_then(|(_, minor)| minor)
}
