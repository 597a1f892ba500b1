// Windows process host: Toolhelp32 for the process table, PSAPI for memory.
//
// CreateToolhelp32Snapshot captures the process list at one point in time.
// Each entry is then opened with PROCESS_QUERY_INFORMATION | PROCESS_VM_READ
// and its working set read with GetProcessMemoryInfo. Entries that cannot be
// opened (protected, exited, access denied) yield None.

use std::mem;

use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32, Process32First, Process32Next, TH32CS_SNAPPROCESS,
};
use windows_sys::Win32::System::ProcessStatus::{GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use windows_sys::Win32::System::Threading::{
    GetCurrentProcess, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_TERMINATE, PROCESS_VM_READ,
    SetProcessWorkingSetSize, TerminateProcess,
};

use crate::error::MemopError;
use crate::model::{Pid, ProcessRecord, TrimOutcome};
use crate::process::{ProcessHost, Snapshot};

/// Native-handle-backed process host.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Host;

impl Win32Host {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessHost for Win32Host {
    fn snapshot(&self) -> Result<Snapshot<'_>, MemopError> {
        let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
        if handle == INVALID_HANDLE_VALUE {
            let code = unsafe { GetLastError() };
            return Err(MemopError::WinApi(format!(
                "CreateToolhelp32Snapshot failed, error={code}"
            )));
        }
        let entries = ToolhelpEntries {
            snapshot: OwnedHandle(handle),
            started: false,
        };
        Ok(Box::new(entries.map(|(pid, name)| inspect(pid, name))))
    }

    fn terminate(&self, pid: Pid) -> bool {
        let Some(process) = open_process(PROCESS_TERMINATE, pid) else {
            return false;
        };
        let ok = unsafe { TerminateProcess(process.0, 1) } != 0;
        if !ok {
            log::debug!("TerminateProcess({pid}) failed, error={}", unsafe {
                GetLastError()
            });
        }
        ok
    }

    fn resident_bytes(&self) -> Option<u64> {
        // Pseudo-handle; must not be closed.
        working_set(unsafe { GetCurrentProcess() })
    }

    fn release_memory(&self) -> TrimOutcome {
        // (SIZE_T)-1 for both bounds asks the memory manager to trim.
        let ok = unsafe { SetProcessWorkingSetSize(GetCurrentProcess(), usize::MAX, usize::MAX) };
        if ok != 0 {
            TrimOutcome::Released
        } else {
            let code = unsafe { GetLastError() };
            TrimOutcome::Failed {
                code: Some(code as i32),
            }
        }
    }
}

/// Closes the wrapped handle on drop.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe { CloseHandle(self.0) };
    }
}

/// Walks a Toolhelp32 process snapshot, yielding (pid, exe name).
struct ToolhelpEntries {
    snapshot: OwnedHandle,
    started: bool,
}

impl Iterator for ToolhelpEntries {
    type Item = (Pid, String);

    fn next(&mut self) -> Option<Self::Item> {
        let mut entry: PROCESSENTRY32 = unsafe { mem::zeroed() };
        entry.dwSize = mem::size_of::<PROCESSENTRY32>() as u32;

        let ok = if self.started {
            unsafe { Process32Next(self.snapshot.0, &mut entry) }
        } else {
            self.started = true;
            unsafe { Process32First(self.snapshot.0, &mut entry) }
        };
        if ok == 0 {
            return None;
        }
        Some((entry.th32ProcessID, exe_file_to_string(&entry.szExeFile)))
    }
}

fn inspect(pid: Pid, name: String) -> Option<ProcessRecord> {
    let Some(process) = open_process(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, pid) else {
        log::debug!("skipping PID {pid} ({name}): OpenProcess failed");
        return None;
    };
    let resident_bytes = working_set(process.0)?;
    Some(ProcessRecord {
        pid,
        name,
        resident_bytes,
    })
}

fn open_process(access: u32, pid: Pid) -> Option<OwnedHandle> {
    let handle = unsafe { OpenProcess(access, 0, pid) };
    if handle.is_null() {
        None
    } else {
        Some(OwnedHandle(handle))
    }
}

fn working_set(process: HANDLE) -> Option<u64> {
    let mut counters: PROCESS_MEMORY_COUNTERS = unsafe { mem::zeroed() };
    let cb = mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
    let ok = unsafe { GetProcessMemoryInfo(process, &mut counters, cb) };
    if ok == 0 {
        None
    } else {
        Some(counters.WorkingSetSize as u64)
    }
}

/// Convert PROCESSENTRY32.szExeFile (NUL-terminated i8 array) to a Rust String.
fn exe_file_to_string(bytes: &[i8]) -> String {
    let as_u8: &[u8] =
        unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const u8, bytes.len()) };
    let len = as_u8.iter().position(|&b| b == 0).unwrap_or(as_u8.len());
    String::from_utf8_lossy(&as_u8[..len]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exe_name_stops_at_nul() {
        let mut raw = [0i8; 16];
        for (i, b) in b"notepad.exe".iter().enumerate() {
            raw[i] = *b as i8;
        }
        assert_eq!(exe_file_to_string(&raw), "notepad.exe");
    }

    #[test]
    fn own_working_set_is_nonzero() {
        assert!(Win32Host::new().resident_bytes().unwrap() > 0);
    }

    #[test]
    fn snapshot_contains_self() {
        let me = std::process::id();
        let found = Win32Host::new()
            .snapshot()
            .unwrap()
            .flatten()
            .any(|r| r.pid == me);
        assert!(found);
    }

    #[test]
    fn terminate_nonexistent_pid_fails() {
        // PIDs are multiples of 4; an odd value is never allocated.
        assert!(!Win32Host::new().terminate(0xFFFF_FFF1));
    }
}
