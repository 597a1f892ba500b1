use crate::model::{TrimOutcome, TrimReport};
use crate::process::ProcessHost;

/// Measure, ask the OS to release reclaimable pages, measure again.
///
/// Never fails: an unsupported or failed release is part of the report.
pub fn trim_working_set<H: ProcessHost + ?Sized>(host: &H) -> TrimReport {
    let before_bytes = host.resident_bytes();
    let outcome = host.release_memory();
    match outcome {
        TrimOutcome::Failed { code: Some(code) } => {
            log::warn!("working set trim failed, error={code}")
        }
        TrimOutcome::Failed { code: None } => log::warn!("working set trim failed"),
        TrimOutcome::Unsupported => log::info!("no working set trim facility on this platform"),
        TrimOutcome::Released | TrimOutcome::NothingReleased => {}
    }
    let after_bytes = host.resident_bytes();

    log::debug!("trim: before={before_bytes:?} after={after_bytes:?} outcome={outcome:?}");
    TrimReport {
        before_bytes,
        outcome,
        after_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemopError;
    use crate::model::Pid;
    use crate::process::Snapshot;
    use std::cell::Cell;

    /// Resident size drops to `after` once release_memory has been called.
    struct ShrinkingHost {
        before: u64,
        after: u64,
        outcome: TrimOutcome,
        released: Cell<bool>,
    }

    impl ProcessHost for ShrinkingHost {
        fn snapshot(&self) -> Result<Snapshot<'_>, MemopError> {
            Ok(Box::new(std::iter::empty()))
        }

        fn terminate(&self, _pid: Pid) -> bool {
            false
        }

        fn resident_bytes(&self) -> Option<u64> {
            Some(if self.released.get() {
                self.after
            } else {
                self.before
            })
        }

        fn release_memory(&self) -> TrimOutcome {
            if self.outcome == TrimOutcome::Released {
                self.released.set(true);
            }
            self.outcome
        }
    }

    fn host(outcome: TrimOutcome) -> ShrinkingHost {
        ShrinkingHost {
            before: 8 * 1024 * 1024,
            after: 2 * 1024 * 1024,
            outcome,
            released: Cell::new(false),
        }
    }

    #[test]
    fn measures_around_release() {
        let report = trim_working_set(&host(TrimOutcome::Released));
        assert_eq!(report.before_bytes, Some(8 * 1024 * 1024));
        assert_eq!(report.after_bytes, Some(2 * 1024 * 1024));
        assert!(report.after_bytes <= report.before_bytes);
    }

    #[test]
    fn unsupported_leaves_size_unchanged() {
        let report = trim_working_set(&host(TrimOutcome::Unsupported));
        assert_eq!(report.outcome, TrimOutcome::Unsupported);
        assert_eq!(report.before_bytes, report.after_bytes);
    }

    #[test]
    fn failure_is_reported_not_raised() {
        let report = trim_working_set(&host(TrimOutcome::Failed { code: Some(5) }));
        assert_eq!(report.outcome, TrimOutcome::Failed { code: Some(5) });
        assert_eq!(report.before_bytes, report.after_bytes);
    }
}
