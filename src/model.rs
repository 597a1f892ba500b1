use std::fmt;

use serde::Serialize;

/// Native process identifier. Windows uses a DWORD, Linux a positive `pid_t`.
pub type Pid = u32;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// One process observed during a single enumeration pass.
///
/// Records are not tied to the live process: by the time a caller acts on
/// `pid`, the process may have exited and the identifier may belong to
/// something else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub name: String,
    pub resident_bytes: u64,
}

impl ProcessRecord {
    pub fn new(pid: Pid, name: impl Into<String>, resident_bytes: u64) -> Self {
        Self {
            pid,
            name: name.into(),
            resident_bytes,
        }
    }

    /// Resident size in whole megabytes, rounded down.
    pub fn resident_mb(&self) -> u64 {
        self.resident_bytes / BYTES_PER_MB
    }
}

/// Minimum resident size, in megabytes, for a process to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Threshold {
    megabytes: u64,
}

impl Threshold {
    pub fn from_megabytes(megabytes: u64) -> Self {
        Self { megabytes }
    }

    pub fn megabytes(&self) -> u64 {
        self.megabytes
    }

    /// Threshold in bytes. Saturates instead of wrapping for huge inputs.
    pub fn bytes(&self) -> u64 {
        self.megabytes.saturating_mul(BYTES_PER_MB)
    }

    pub fn admits(&self, record: &ProcessRecord) -> bool {
        record.resident_bytes >= self.bytes()
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB", self.megabytes)
    }
}

/// Result of asking the OS to release reclaimable pages of this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimOutcome {
    Released,
    NothingReleased,
    Unsupported,
    Failed { code: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimReport {
    pub before_bytes: Option<u64>,
    pub outcome: TrimOutcome,
    pub after_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationReport {
    pub pid: Pid,
    pub terminated: bool,
}
