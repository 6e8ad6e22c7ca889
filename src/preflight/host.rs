//! Live system queries behind the pre-flight checks.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::shell::is_elevated;
use crate::steps::probe::{parse_system_path, resolve_tool_path};

/// The questions pre-flight asks about the machine.
pub trait SystemInspector {
    /// Bytes available to an unprivileged user on the filesystem holding
    /// `path`.
    fn free_disk_bytes(&self, path: &Path) -> io::Result<u64>;

    /// Whether a TCP connection to `probe` (`host:port`) succeeds within
    /// `timeout`.
    fn network_reachable(&self, probe: &str, timeout: Duration) -> bool;

    fn is_root(&self) -> bool;

    /// Whether `sudo` is on PATH.
    fn sudo_available(&self) -> bool;

    /// Whether `sudo -v` succeeds, prompting for a password if it may.
    fn sudo_validates(&self) -> bool;
}

/// Inspects the machine rigup runs on.
#[derive(Debug, Clone, Copy)]
pub struct HostInspector {
    /// When false, `sudo` is never allowed to prompt.
    pub interactive: bool,
}

impl HostInspector {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }
}

impl SystemInspector for HostInspector {
    #[cfg(unix)]
    fn free_disk_bytes(&self, path: &Path) -> io::Result<u64> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // SAFETY: statvfs only writes into the zeroed struct we own, and
        // c_path is a valid NUL-terminated string for the whole call.
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        #[allow(clippy::unnecessary_cast)]
        Ok(stat.f_bavail as u64 * stat.f_frsize as u64)
    }

    #[cfg(not(unix))]
    fn free_disk_bytes(&self, _path: &Path) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "free space check needs a unix host",
        ))
    }

    fn network_reachable(&self, probe: &str, timeout: Duration) -> bool {
        let addrs = match probe.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!("Cannot resolve {}: {}", probe, e);
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, timeout).is_ok() {
                return true;
            }
        }
        false
    }

    fn is_root(&self) -> bool {
        is_elevated()
    }

    fn sudo_available(&self) -> bool {
        resolve_tool_path("sudo", &parse_system_path()).is_some()
    }

    fn sudo_validates(&self) -> bool {
        let mut cmd = Command::new("sudo");
        if self.interactive {
            cmd.arg("-v");
        } else {
            cmd.args(["-n", "-v"]);
        }
        cmd.status().is_ok_and(|s| s.success())
    }
}
