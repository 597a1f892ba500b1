// Platform-abstracted process inspection.
//
// On Linux: reads /proc/<pid>/statm and /proc/<pid>/comm, signals with kill(2).
// On Windows: Toolhelp32 snapshot + PSAPI working-set queries, TerminateProcess.
// Elsewhere: empty process table, no trim facility.
//
// Every platform exports `NativeHost`, an implementation of `ProcessHost`.

#[cfg(target_os = "linux")]
pub(crate) mod linux;
#[cfg(target_os = "linux")]
pub use linux::ProcFs as NativeHost;

#[cfg(target_os = "windows")]
pub(crate) mod windows;
#[cfg(target_os = "windows")]
pub use windows::Win32Host as NativeHost;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod fallback;
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub use fallback::FallbackHost as NativeHost;

use crate::error::MemopError;
use crate::model::{Pid, ProcessRecord, TerminationReport, Threshold, TrimOutcome};

/// One point-in-time listing of the process table.
///
/// Each item is the result of a per-process lookup taken lazily as the
/// iterator advances; `None` means the lookup failed (exited, access denied,
/// unreadable data). The sequence can be consumed once and does not track
/// later changes to the table.
pub type Snapshot<'a> = Box<dyn Iterator<Item = Option<ProcessRecord>> + 'a>;

/// OS capabilities the dispatcher needs.
pub trait ProcessHost {
    /// Capture the process table.
    fn snapshot(&self) -> Result<Snapshot<'_>, MemopError>;

    /// Ask the OS to stop `pid`. Returns `false` on any failure.
    fn terminate(&self, pid: Pid) -> bool;

    /// Resident size of the calling process, if it can be read.
    fn resident_bytes(&self) -> Option<u64>;

    /// Ask the OS to reclaim unused resident pages of the calling process.
    fn release_memory(&self) -> TrimOutcome;
}

/// Processes whose resident size is at or above `threshold`, in snapshot order.
///
/// Failed per-process lookups are skipped, never reported as errors.
pub fn high_memory_processes<H: ProcessHost + ?Sized>(
    host: &H,
    threshold: Threshold,
) -> Result<Vec<ProcessRecord>, MemopError> {
    let mut seen: u64 = 0;
    let mut skipped: u64 = 0;
    let mut matched = Vec::new();

    for lookup in host.snapshot()? {
        seen += 1;
        let Some(record) = lookup else {
            skipped += 1;
            continue;
        };
        if threshold.admits(&record) {
            matched.push(record);
        }
    }

    log::info!(
        "Scanned {} processes ({} unreadable), {} at or above {}",
        seen,
        skipped,
        matched.len(),
        threshold
    );
    Ok(matched)
}

/// Attempt to terminate every record, in order.
///
/// Identifiers are used as captured. A process that exited since the
/// snapshot yields `terminated: false`; a reused identifier hits whatever
/// process owns it now.
pub fn terminate_all<H: ProcessHost + ?Sized>(
    host: &H,
    records: &[ProcessRecord],
) -> Vec<TerminationReport> {
    records
        .iter()
        .map(|r| {
            let terminated = host.terminate(r.pid);
            if !terminated {
                log::warn!("failed to terminate PID {} ({})", r.pid, r.name);
            }
            TerminationReport {
                pid: r.pid,
                terminated,
            }
        })
        .collect()
}
