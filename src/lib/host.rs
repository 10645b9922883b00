// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{ErrorKind, KernelState, SetIpError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(success: bool, stdout: &str, stderr: &str) -> Self {
        Self {
            success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }
}

/// Everything setip needs from the host: running tools, touching files and
/// reading kernel network state. The backends and the prober only talk to
/// the host through this trait.
pub trait HostOps {
    /// Run program and wait for it to finish. Failure to spawn the program
    /// is an error, non-zero exit is reported by [CommandOutput::success].
    fn run(
        &self,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutput, SetIpError>;

    /// Whether program could be found in `PATH`.
    fn command_exists(&self, program: &str) -> bool;

    fn read_file(&self, path: &Path) -> Result<String, SetIpError>;

    /// Replace file content, the file ends up with permission `mode`.
    fn write_file(
        &self,
        path: &Path,
        content: &str,
        mode: u32,
    ) -> Result<(), SetIpError>;

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), SetIpError>;

    fn path_exists(&self, path: &Path) -> bool;

    /// Sorted list of entries in folder.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, SetIpError>;

    fn retrieve_kernel_state(&self) -> Result<KernelState, SetIpError>;

    fn is_root(&self) -> bool;

    fn sleep(&self, duration: Duration);
}

/// Run command and fail with [ErrorKind::ApplyError] on non-zero exit.
pub(crate) fn run_checked(
    host: &dyn HostOps,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput, SetIpError> {
    let output = host.run(program, args)?;
    if output.success {
        Ok(output)
    } else {
        let e = SetIpError::new(
            ErrorKind::ApplyError,
            format!(
                "Command '{} {}' failed: {}",
                program,
                args.join(" "),
                output.stderr.trim()
            ),
        );
        log::error!("{}", e);
        Err(e)
    }
}

#[cfg(feature = "query_apply")]
pub use self::system::HostSystem;

#[cfg(feature = "query_apply")]
mod system {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    use std::path::{Path, PathBuf};
    use std::process::Command;
    use std::time::Duration;

    use super::{CommandOutput, HostOps};
    use crate::{
        nispor::nispor_retrieve, ErrorKind, KernelState, SetIpError,
    };

    const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:\
        /usr/bin:/sbin:/bin";

    /// [HostOps] acting on the running system.
    #[derive(Debug, Default, Clone, Copy)]
    #[non_exhaustive]
    pub struct HostSystem;

    impl HostSystem {
        pub fn new() -> Self {
            Self
        }
    }

    fn search_path() -> String {
        match std::env::var("PATH") {
            Ok(p) if !p.is_empty() => format!("{p}:{DEFAULT_PATH}"),
            _ => DEFAULT_PATH.to_string(),
        }
    }

    impl HostOps for HostSystem {
        fn run(
            &self,
            program: &str,
            args: &[&str],
        ) -> Result<CommandOutput, SetIpError> {
            log::debug!("Running command: {} {}", program, args.join(" "));
            let output = Command::new(program)
                .env("PATH", search_path())
                .env("LC_ALL", "C")
                .args(args)
                .output()
                .map_err(|e| {
                    SetIpError::new(
                        ErrorKind::ApplyError,
                        format!("Failed to execute {program}: {e}"),
                    )
                })?;
            let ret = CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            };
            log::debug!("Command {} exited with {}", program, output.status);
            Ok(ret)
        }

        fn command_exists(&self, program: &str) -> bool {
            search_path()
                .split(':')
                .filter(|d| !d.is_empty())
                .any(|d| Path::new(d).join(program).is_file())
        }

        fn read_file(&self, path: &Path) -> Result<String, SetIpError> {
            Ok(std::fs::read_to_string(path)?)
        }

        // Write into temporary file in the same folder and then rename, so
        // backend never sees half written file.
        fn write_file(
            &self,
            path: &Path,
            content: &str,
            mode: u32,
        ) -> Result<(), SetIpError> {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let tmp_path = path.with_file_name(format!(
                ".{}.{}.tmp",
                file_name,
                uuid::Uuid::new_v4()
            ));
            let mut fd = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(mode)
                .open(&tmp_path)?;
            fd.write_all(content.as_bytes())?;
            fd.sync_all()?;
            if let Err(e) = std::fs::rename(&tmp_path, path) {
                if let Err(e) = std::fs::remove_file(&tmp_path) {
                    log::warn!(
                        "Failed to remove temporary file {}: {e}",
                        tmp_path.display()
                    );
                }
                return Err(e.into());
            }
            log::debug!("Wrote file {}", path.display());
            Ok(())
        }

        fn copy_file(&self, from: &Path, to: &Path) -> Result<(), SetIpError> {
            std::fs::copy(from, to)?;
            Ok(())
        }

        fn path_exists(&self, path: &Path) -> bool {
            path.exists()
        }

        fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, SetIpError> {
            let mut ret = Vec::new();
            for entry in path.read_dir()? {
                ret.push(entry?.path());
            }
            ret.sort_unstable();
            Ok(ret)
        }

        fn retrieve_kernel_state(&self) -> Result<KernelState, SetIpError> {
            nispor_retrieve()
        }

        fn is_root(&self) -> bool {
            nix::unistd::Uid::effective().is_root()
        }

        fn sleep(&self, duration: Duration) {
            std::thread::sleep(duration)
        }
    }
}
