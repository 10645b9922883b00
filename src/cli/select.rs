// SPDX-License-Identifier: Apache-2.0

use std::io::{BufRead, Write};

use setip::{ErrorKind, InterfaceInfo, InterfaceSelector, SetIpError};

/// Ask user on terminal which interface to configure. Single candidate is
/// chosen without asking.
pub(crate) struct TerminalSelector;

impl InterfaceSelector for TerminalSelector {
    fn select(
        &self,
        candidates: &[InterfaceInfo],
    ) -> Result<String, SetIpError> {
        if let [iface] = candidates {
            log::info!("Only found interface {}, selecting it", iface.name);
            return Ok(iface.name.clone());
        }

        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();
        loop {
            writeln!(stderr, "Available interfaces:")?;
            for (i, iface) in candidates.iter().enumerate() {
                writeln!(stderr, "  {}) {}", i + 1, iface)?;
            }
            write!(
                stderr,
                "Select interface [1-{}] or name: ",
                candidates.len()
            )?;
            stderr.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Err(SetIpError::new(
                    ErrorKind::InvalidArgument,
                    "No interface selected, use --interface to specify one"
                        .to_string(),
                ));
            }
            match parse_choice(&line, candidates) {
                Some(name) => return Ok(name),
                None => {
                    writeln!(stderr, "Invalid choice: {}", line.trim())?;
                }
            }
        }
    }
}

// Accept both the index shown in prompt and the interface name.
fn parse_choice(input: &str, candidates: &[InterfaceInfo]) -> Option<String> {
    let input = input.trim();
    if let Ok(index) = input.parse::<usize>() {
        if index >= 1 {
            return candidates.get(index - 1).map(|i| i.name.clone());
        }
        return None;
    }
    candidates
        .iter()
        .find(|i| i.name == input)
        .map(|i| i.name.clone())
}
