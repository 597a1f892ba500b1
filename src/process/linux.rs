// Linux process host: reads /proc for the process table.
//
// 1. List numeric entries of /proc → the snapshot of live PIDs
// 2. Per PID: /proc/<pid>/statm field 2 (resident pages) × page size
// 3. Per PID: /proc/<pid>/comm for the name (best effort)
//
// Trimming uses glibc's malloc_trim; termination sends SIGTERM.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::MemopError;
use crate::model::{Pid, ProcessRecord, TrimOutcome};
use crate::process::{ProcessHost, Snapshot};

const DEFAULT_PROC_ROOT: &str = "/proc";
const FALLBACK_PAGE_SIZE: u64 = 4096;

/// `/proc`-backed process host.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
    page_size: u64,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcFs {
    /// Host over the real `/proc` with the system page size.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_PROC_ROOT, system_page_size())
    }

    /// Host over an arbitrary directory laid out like `/proc`.
    pub fn with_root(root: impl Into<PathBuf>, page_size: u64) -> Self {
        Self {
            root: root.into(),
            page_size,
        }
    }

    /// Collect the PIDs currently listed under the root.
    fn list_pids(&self) -> Result<Vec<Pid>, MemopError> {
        let dir = fs::read_dir(&self.root).map_err(MemopError::ProcessTable)?;
        let pids = dir
            .flatten()
            .filter_map(|entry| parse_pid(&entry.file_name().to_string_lossy()))
            .collect();
        Ok(pids)
    }

    /// Read one process. `None` if it vanished or statm is unreadable.
    fn inspect(&self, pid: Pid) -> Option<ProcessRecord> {
        let dir = self.root.join(pid.to_string());
        let resident_bytes = match self.read_resident(&dir) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("skipping PID {pid}: {e}");
                return None;
            }
        };
        Some(ProcessRecord {
            pid,
            name: read_comm(&dir),
            resident_bytes,
        })
    }

    fn read_resident(&self, proc_dir: &Path) -> io::Result<u64> {
        let content = fs::read_to_string(proc_dir.join("statm"))?;
        let pages = parse_statm_resident(&content)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed statm"))?;
        Ok(pages.saturating_mul(self.page_size))
    }
}

impl ProcessHost for ProcFs {
    fn snapshot(&self) -> Result<Snapshot<'_>, MemopError> {
        let pids = self.list_pids()?;
        log::debug!("{} PIDs listed under {}", pids.len(), self.root.display());
        Ok(Box::new(pids.into_iter().map(move |pid| self.inspect(pid))))
    }

    fn terminate(&self, pid: Pid) -> bool {
        send_sigterm(pid)
    }

    fn resident_bytes(&self) -> Option<u64> {
        match self.read_resident(&self.root.join("self")) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("cannot read own resident size: {e}");
                None
            }
        }
    }

    fn release_memory(&self) -> TrimOutcome {
        malloc_trim()
    }
}

/// Only all-digit, non-zero directory names are PIDs.
pub(crate) fn parse_pid(name: &str) -> Option<Pid> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match name.parse::<Pid>() {
        Ok(0) | Err(_) => None,
        Ok(pid) => Some(pid),
    }
}

/// Parse the resident page count out of /proc/<pid>/statm.
///
/// Format: `size resident shared text lib data dt`, all in pages.
pub(crate) fn parse_statm_resident(content: &str) -> Option<u64> {
    content.split_whitespace().nth(1)?.parse().ok()
}

/// Read /proc/<pid>/comm. Empty when unavailable.
fn read_comm(proc_dir: &Path) -> String {
    match fs::read_to_string(proc_dir.join("comm")) {
        Ok(s) => s.trim_end_matches('\n').to_string(),
        Err(_) => String::new(),
    }
}

fn system_page_size() -> u64 {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        FALLBACK_PAGE_SIZE
    }
}

/// Send SIGTERM to a single process.
///
/// 0 and values that do not fit a positive pid_t are refused: kill(2) treats
/// them as process-group or broadcast targets.
fn send_sigterm(pid: Pid) -> bool {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    if unsafe { libc::kill(raw, libc::SIGTERM) } == 0 {
        true
    } else {
        log::debug!("kill({pid}, SIGTERM): {}", io::Error::last_os_error());
        false
    }
}

#[cfg(target_env = "gnu")]
fn malloc_trim() -> TrimOutcome {
    // Returns 1 when memory was handed back to the kernel, 0 otherwise.
    if unsafe { libc::malloc_trim(0) } == 1 {
        TrimOutcome::Released
    } else {
        TrimOutcome::NothingReleased
    }
}

#[cfg(not(target_env = "gnu"))]
fn malloc_trim() -> TrimOutcome {
    TrimOutcome::Unsupported
}
