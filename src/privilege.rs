/// Whether the process runs with administrative rights.
///
/// `None` when the platform offers no cheap check.
#[cfg(unix)]
pub fn is_elevated() -> Option<bool> {
    Some(unsafe { libc::geteuid() } == 0)
}

#[cfg(not(unix))]
pub fn is_elevated() -> Option<bool> {
    None
}

/// Log a warning before a kill pass that will likely hit permission errors.
pub fn warn_if_unprivileged() {
    if is_elevated() == Some(false) {
        log::warn!(
            "not running as root: terminating processes owned by other users will fail"
        );
    }
}
