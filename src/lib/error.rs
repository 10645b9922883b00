// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedPlatform,
    NoBackendDetected,
    MissingPrefix,
    ApplyError,
    VerificationFailed,
    PermissionError,
    Bug,
}

impl ErrorKind {
    // Only the verifier retries, and only while polling for the new address
    // to show up in kernel.
    pub(crate) fn can_retry(&self) -> bool {
        matches!(self, ErrorKind::VerificationFailed)
    }
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::Bug
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for SetIpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}

impl Error for SetIpError {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SetIpError {
    kind: ErrorKind,
    msg: String,
}

impl SetIpError {
    pub fn new(kind: ErrorKind, msg: String) -> Self {
        Self { kind, msg }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }
}

impl From<std::io::Error> for SetIpError {
    fn from(e: std::io::Error) -> Self {
        let kind = if e.kind() == std::io::ErrorKind::PermissionDenied {
            ErrorKind::PermissionError
        } else {
            ErrorKind::Bug
        };
        SetIpError::new(kind, format!("IO error: {e}"))
    }
}

impl From<serde_yaml::Error> for SetIpError {
    fn from(e: serde_yaml::Error) -> Self {
        SetIpError::new(
            ErrorKind::ApplyError,
            format!("Invalid YAML content: {e}"),
        )
    }
}

impl From<serde_json::Error> for SetIpError {
    fn from(e: serde_json::Error) -> Self {
        SetIpError::new(
            ErrorKind::Bug,
            format!("Failed to serialize or parse JSON: {e}"),
        )
    }
}
