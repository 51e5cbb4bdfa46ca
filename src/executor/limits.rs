use std::io;

use tokio::process::Command;

use crate::config::{MAX_CPU_SECONDS, MAX_MEMORY_BYTES};

/// Per-process resource ceilings, applied to a child at spawn time.
///
/// The limits are an immutable value handed to the spawn call, never state
/// on the service process itself, so concurrent executions cannot observe
/// each other's configuration. A child that exceeds a ceiling is signalled
/// by the kernel and shows up as a non-zero or signalled exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// CPU seconds, set as both the soft and hard rlimit.
    pub cpu_seconds: u64,
    /// Address-space size in bytes, set as both the soft and hard rlimit.
    pub memory_bytes: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            cpu_seconds: MAX_CPU_SECONDS,
            memory_bytes: MAX_MEMORY_BYTES,
        }
    }
}

impl ResourceLimits {
    /// Registers a pre-exec hook on `cmd` that applies the limits in the
    /// forked child, between fork and exec.
    pub fn apply_to(&self, cmd: &mut Command) {
        let cpu = self.cpu_seconds as libc::rlim_t;
        let mem = self.memory_bytes as libc::rlim_t;

        // Safety: the hook only calls async-signal-safe libc functions.
        unsafe {
            cmd.pre_exec(move || {
                set_rlimit(libc::RLIMIT_CPU, cpu)?;
                set_rlimit(libc::RLIMIT_AS, mem)?;
                Ok(())
            });
        }
    }
}

#[cfg(target_env = "gnu")]
type RlimitResource = libc::__rlimit_resource_t;
#[cfg(not(target_env = "gnu"))]
type RlimitResource = libc::c_int;

fn set_rlimit(resource: RlimitResource, value: libc::rlim_t) -> io::Result<()> {
    let limit = libc::rlimit {
        rlim_cur: value,
        rlim_max: value,
    };
    if unsafe { libc::setrlimit(resource, &limit) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = ResourceLimits::default();
        assert_eq!(limits.cpu_seconds, 2);
        assert_eq!(limits.memory_bytes, 256 * 1024 * 1024);
    }
}
