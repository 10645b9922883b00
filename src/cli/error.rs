// SPDX-License-Identifier: Apache-2.0

use setip::SetIpError;

// Every failure exits with the same code, scripts only check for non-zero.
pub(crate) const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Default)]
pub(crate) struct CliError {
    pub(crate) code: i32,
    pub(crate) error_msg: String,
}

impl From<&str> for CliError {
    fn from(msg: &str) -> Self {
        Self {
            code: EXIT_FAILURE,
            error_msg: msg.into(),
        }
    }
}

impl From<String> for CliError {
    fn from(error_msg: String) -> Self {
        Self {
            code: EXIT_FAILURE,
            error_msg,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_msg)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self {
            code: EXIT_FAILURE,
            error_msg: format!("std::io::Error: {e}"),
        }
    }
}

impl From<SetIpError> for CliError {
    fn from(e: SetIpError) -> Self {
        Self {
            code: EXIT_FAILURE,
            error_msg: e.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        Self {
            code: EXIT_FAILURE,
            error_msg: format!("serde_yaml::Error: {e}"),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            code: EXIT_FAILURE,
            error_msg: format!("serde_json::Error: {e}"),
        }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        Self {
            code: EXIT_FAILURE,
            error_msg: format!("toml::de::Error: {e}"),
        }
    }
}
