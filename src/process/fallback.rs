// Fallback host for targets without a process-table reader (macOS, BSDs).
//
// The table is always empty and there is no trim facility. On Unix,
// termination still goes through kill(2).

use crate::error::MemopError;
use crate::model::{Pid, TrimOutcome};
use crate::process::{ProcessHost, Snapshot};

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackHost;

impl FallbackHost {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessHost for FallbackHost {
    fn snapshot(&self) -> Result<Snapshot<'_>, MemopError> {
        log::warn!("process enumeration is not supported on this platform");
        Ok(Box::new(std::iter::empty()))
    }

    #[cfg(unix)]
    fn terminate(&self, pid: Pid) -> bool {
        match libc::pid_t::try_from(pid) {
            Ok(raw) if raw > 0 => unsafe { libc::kill(raw, libc::SIGTERM) == 0 },
            _ => false,
        }
    }

    #[cfg(not(unix))]
    fn terminate(&self, _pid: Pid) -> bool {
        false
    }

    fn resident_bytes(&self) -> Option<u64> {
        None
    }

    fn release_memory(&self) -> TrimOutcome {
        TrimOutcome::Unsupported
    }
}
