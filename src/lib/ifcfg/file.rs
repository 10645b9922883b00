// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, PartialEq, Eq)]
enum IfcfgLine {
    Entry { key: String, value: String },
    // Comment, blank line or anything not in `KEY=VALUE` form
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Shell style `KEY=VALUE` file of legacy network-scripts. Lines not
/// touched are written back as they were.
pub(crate) struct IfcfgFile {
    lines: Vec<IfcfgLine>,
}

impl IfcfgFile {
    pub(crate) fn new_for_iface(iface_name: &str) -> Self {
        let mut ret = Self::default();
        ret.append("DEVICE", iface_name);
        ret.append("BOOTPROTO", "none");
        ret.append("ONBOOT", "yes");
        ret
    }

    pub(crate) fn parse(content: &str) -> Self {
        let mut ret = Self::default();
        for line in content.lines() {
            let trimmed = line.trim();
            let entry = if trimmed.starts_with('#') {
                None
            } else {
                trimmed.split_once('=').and_then(|(k, v)| {
                    let k = k.trim();
                    if !k.is_empty()
                        && k.chars()
                            .all(|c| c.is_ascii_alphanumeric() || c == '_')
                    {
                        Some(IfcfgLine::Entry {
                            key: k.to_string(),
                            value: v.trim().to_string(),
                        })
                    } else {
                        None
                    }
                })
            };
            ret.lines.push(
                entry.unwrap_or_else(|| IfcfgLine::Other(line.to_string())),
            );
        }
        ret
    }

    /// Value of last entry of key with quotes removed.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|l| match l {
            IfcfgLine::Entry { key: k, value } if k == key => {
                Some(value.trim_matches('"').trim_matches('\''))
            }
            _ => None,
        })
    }

    pub(crate) fn remove(&mut self, keys: &[&str]) {
        self.lines.retain(|l| match l {
            IfcfgLine::Entry { key, .. } => !keys.contains(&key.as_str()),
            IfcfgLine::Other(_) => true,
        });
    }

    pub(crate) fn append(&mut self, key: &str, value: &str) {
        self.lines.push(IfcfgLine::Entry {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Change value of existing entries in place, append if not found.
    pub(crate) fn replace(&mut self, key: &str, value: &str) {
        let mut found = false;
        for line in self.lines.iter_mut() {
            if let IfcfgLine::Entry { key: k, value: v } = line {
                if k == key {
                    *v = value.to_string();
                    found = true;
                }
            }
        }
        if !found {
            self.append(key, value);
        }
    }
}

impl std::fmt::Display for IfcfgFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            match line {
                IfcfgLine::Entry { key, value } => {
                    writeln!(f, "{key}={value}")?
                }
                IfcfgLine::Other(l) => writeln!(f, "{l}")?,
            }
        }
        Ok(())
    }
}
