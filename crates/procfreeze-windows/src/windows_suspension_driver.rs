use procfreeze_core::{
    ControlError, ControlResult, DriverConfig, ProcessId, SuspensionDriver, SuspensionState,
    Transition,
};

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use crate::handle::OwnedHandle;
    use crate::ntdll::{
        self, STATUS_ACCESS_DENIED, STATUS_SUSPEND_COUNT_EXCEEDED, STATUS_THREAD_IS_TERMINATING,
    };
    use crate::thread_passes::{ThreadSet, reconcile, resume_until_running};
    use crate::thread_snapshot::snapshot_threads;
    use tracing::{debug, info, warn};
    use windows::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, NTSTATUS, STILL_ACTIVE,
    };
    use windows::Win32::System::Threading::{
        GetCurrentThreadId, GetExitCodeProcess, OpenProcess, OpenThread, PROCESS_ACCESS_RIGHTS,
        PROCESS_QUERY_LIMITED_INFORMATION, THREAD_SUSPEND_RESUME,
    };

    /// Process handles are only used for liveness checks; threads are
    /// transitioned through their own handles
    const PROCESS_ACCESS: PROCESS_ACCESS_RIGHTS = PROCESS_QUERY_LIMITED_INFORMATION;

    /// What happened to one thread during a pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum ThreadOutcome {
        Done,
        Vanished,
        Denied,
        Failed(i32),
    }

    /// Per-thread results of one operation, aggregated into a single outcome
    #[derive(Debug, Default)]
    struct PassTally {
        done: usize,
        vanished: usize,
        denied: usize,
        failed: usize,
        first_code: Option<i32>,
    }

    impl PassTally {
        fn record(&mut self, outcome: ThreadOutcome) {
            match outcome {
                ThreadOutcome::Done => self.done += 1,
                ThreadOutcome::Vanished => self.vanished += 1,
                ThreadOutcome::Denied => self.denied += 1,
                ThreadOutcome::Failed(code) => {
                    self.failed += 1;
                    self.first_code.get_or_insert(code);
                }
            }
        }

        /// Fold the tally into the facade-level outcome
        ///
        /// Any transitioned thread makes the call applied. With none, access
        /// denial wins over other failures, and a run where every thread
        /// vanished means the process went away under us.
        fn conclude(
            self,
            pid: ProcessId,
            operation: &'static str,
            unreconciled: usize,
        ) -> ControlResult<Transition> {
            if self.done > 0 {
                let failed = self.denied + self.failed;
                if failed > 0 || unreconciled > 0 {
                    warn!(
                        pid = %pid,
                        done = self.done,
                        failed,
                        unreconciled,
                        "Process {} applied with best-effort thread coverage", operation
                    );
                } else {
                    info!(pid = %pid, threads = self.done, "Process {} applied", operation);
                }
                return Ok(Transition::best_effort(unreconciled, failed));
            }

            if self.denied > 0 {
                warn!(pid = %pid, "Permission denied to {} any thread", operation);
                return Err(ControlError::permission_denied(pid, operation));
            }

            if let Some(code) = self.first_code {
                warn!(pid = %pid, code, "Failed to {} any thread", operation);
                return Err(ControlError::os(pid, operation, code));
            }

            info!(pid = %pid, vanished = self.vanished, "Process exited during {}", operation);
            Ok(Transition::vanished())
        }
    }

    fn classify_status(status: NTSTATUS) -> ThreadOutcome {
        match status {
            STATUS_THREAD_IS_TERMINATING => ThreadOutcome::Vanished,
            STATUS_ACCESS_DENIED => ThreadOutcome::Denied,
            other => ThreadOutcome::Failed(other.0),
        }
    }

    fn open_thread(tid: u32) -> Result<OwnedHandle, ThreadOutcome> {
        // SAFETY: OpenThread has no preconditions, the handle is owned on success
        match unsafe { OpenThread(THREAD_SUSPEND_RESUME, false, tid) } {
            Ok(handle) => Ok(OwnedHandle::new(handle)),
            // The id no longer names a thread
            Err(e) if e.code() == ERROR_INVALID_PARAMETER.to_hresult() => {
                Err(ThreadOutcome::Vanished)
            }
            Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => Err(ThreadOutcome::Denied),
            Err(e) => Err(ThreadOutcome::Failed(e.code().0)),
        }
    }

    fn suspend_thread(tid: u32) -> ThreadOutcome {
        let thread = match open_thread(tid) {
            Ok(thread) => thread,
            Err(outcome) => return outcome,
        };

        match ntdll::suspend_thread(&thread) {
            Ok(0) => ThreadOutcome::Done,
            Ok(previous) => {
                // Already suspended: drop our extra count so repeat calls stay idempotent
                if let Err(status) = ntdll::resume_thread(&thread) {
                    warn!(tid, previous, status = status.0, "Failed to undo extra suspension");
                }
                ThreadOutcome::Done
            }
            Err(STATUS_SUSPEND_COUNT_EXCEEDED) => ThreadOutcome::Done,
            Err(status) => classify_status(status),
        }
    }

    fn resume_thread(tid: u32, max_passes: u32) -> ThreadOutcome {
        let thread = match open_thread(tid) {
            Ok(thread) => thread,
            Err(outcome) => return outcome,
        };

        match resume_until_running(max_passes, || ntdll::resume_thread(&thread)) {
            Ok(true) => ThreadOutcome::Done,
            Ok(false) => {
                warn!(tid, max_passes, "Thread still suspended after maximum resume passes");
                ThreadOutcome::Failed(STATUS_SUSPEND_COUNT_EXCEEDED.0)
            }
            Err(status) => classify_status(status),
        }
    }

    /// Probe a thread's suspend count without changing it
    fn probe_thread(tid: u32) -> Result<bool, ThreadOutcome> {
        let thread = open_thread(tid)?;
        let previous = ntdll::suspend_thread(&thread).map_err(classify_status)?;
        ntdll::resume_thread(&thread).map_err(classify_status)?;
        Ok(previous > 0)
    }

    /// Thread-enumeration suspension driver
    ///
    /// Windows has no documented whole-process suspend, so a process is frozen
    /// by suspending each of its threads. New threads can appear between the
    /// snapshot and the suspend pass; a bounded number of reconciliation
    /// rounds catches most of them, and the remainder is reported as
    /// best-effort coverage instead of failing the call.
    pub struct WindowsSuspensionDriver {
        config: DriverConfig,
    }

    impl Default for WindowsSuspensionDriver {
        fn default() -> Self {
            Self::new(&DriverConfig::default())
        }
    }

    impl WindowsSuspensionDriver {
        /// Open the process for the duration of one operation
        ///
        /// Returns `None` when the process does not exist or has already
        /// exited. Holding the handle keeps the pid from being reused until
        /// the operation finishes.
        fn open_live_process(
            &self,
            pid: ProcessId,
            operation: &'static str,
        ) -> ControlResult<Option<OwnedHandle>> {
            // SAFETY: OpenProcess has no preconditions, the handle is owned on success
            let process = match unsafe { OpenProcess(PROCESS_ACCESS, false, pid.as_raw()) } {
                Ok(handle) => OwnedHandle::new(handle),
                Err(e) if e.code() == ERROR_INVALID_PARAMETER.to_hresult() => {
                    info!(pid = %pid, "Process not found");
                    return Ok(None);
                }
                Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => {
                    warn!(pid = %pid, "Permission denied to open process");
                    return Err(ControlError::permission_denied(pid, operation));
                }
                Err(e) => {
                    warn!(pid = %pid, error = %e, "Failed to open process");
                    return Err(ControlError::os(pid, operation, e.code().0));
                }
            };

            if is_alive(&process).map_err(|code| ControlError::os(pid, operation, code))? {
                Ok(Some(process))
            } else {
                info!(pid = %pid, "Process has already exited");
                Ok(None)
            }
        }

        /// Threads of `pid`, minus the calling thread when targeting ourselves
        fn snapshot(&self, pid: ProcessId, operation: &'static str) -> ControlResult<ThreadSet> {
            let mut threads = snapshot_threads(pid.as_raw()).map_err(|e| {
                warn!(pid = %pid, error = %e, "Failed to snapshot threads");
                ControlError::os(pid, operation, e.code().0)
            })?;

            // A thread that suspends itself never gets to resume
            if pid.as_raw() == std::process::id() {
                // SAFETY: no preconditions
                threads.remove(&unsafe { GetCurrentThreadId() });
            }
            Ok(threads)
        }

        fn suspend(&self, pid: ProcessId) -> ControlResult<Transition> {
            const OPERATION: &str = "suspend";

            let Some(_process) = self.open_live_process(pid, OPERATION)? else {
                return Ok(Transition::vanished());
            };

            let mut attempted = self.snapshot(pid, OPERATION)?;
            debug!(pid = %pid, threads = attempted.len(), "Suspending threads");

            let mut tally = PassTally::default();
            for &tid in &attempted {
                let outcome = suspend_thread(tid);
                debug!(tid, outcome = ?outcome, "Suspend thread");
                tally.record(outcome);
            }

            let unreconciled = reconcile(
                &mut attempted,
                self.config.reconcile_rounds,
                || self.snapshot(pid, OPERATION),
                |tid| tally.record(suspend_thread(tid)),
            )?;

            tally.conclude(pid, OPERATION, unreconciled)
        }

        fn resume(&self, pid: ProcessId) -> ControlResult<Transition> {
            const OPERATION: &str = "resume";

            let Some(_process) = self.open_live_process(pid, OPERATION)? else {
                return Ok(Transition::vanished());
            };

            // No reconciliation: a thread born mid-resume was never suspended
            let threads = self.snapshot(pid, OPERATION)?;
            debug!(pid = %pid, threads = threads.len(), "Resuming threads");

            let mut tally = PassTally::default();
            for &tid in &threads {
                let outcome = resume_thread(tid, self.config.max_resume_passes);
                debug!(tid, outcome = ?outcome, "Resume thread");
                tally.record(outcome);
            }

            tally.conclude(pid, OPERATION, 0)
        }
    }

    fn is_alive(process: &OwnedHandle) -> Result<bool, i32> {
        let mut exit_code = 0u32;
        // SAFETY: the handle was opened with PROCESS_QUERY_LIMITED_INFORMATION
        unsafe { GetExitCodeProcess(process.raw(), &mut exit_code) }.map_err(|e| e.code().0)?;
        Ok(exit_code == STILL_ACTIVE.0 as u32)
    }

    impl SuspensionDriver for WindowsSuspensionDriver {
        fn new(config: &DriverConfig) -> Self {
            debug!("Initializing Windows suspension driver");
            Self {
                config: config.clone(),
            }
        }

        fn exists(&self, pid: ProcessId) -> ControlResult<bool> {
            // SAFETY: OpenProcess has no preconditions, the handle is owned on success
            match unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid.as_raw()) } {
                Ok(handle) => {
                    let process = OwnedHandle::new(handle);
                    is_alive(&process).map_err(|code| ControlError::os(pid, "probe", code))
                }
                Err(e) if e.code() == ERROR_INVALID_PARAMETER.to_hresult() => Ok(false),
                // Exists, just not ours
                Err(e) if e.code() == ERROR_ACCESS_DENIED.to_hresult() => Ok(true),
                Err(e) => Err(ControlError::os(pid, "probe", e.code().0)),
            }
        }

        fn set_suspended(&self, pid: ProcessId, want_suspended: bool) -> ControlResult<Transition> {
            if want_suspended {
                self.suspend(pid)
            } else {
                self.resume(pid)
            }
        }

        fn state(&self, pid: ProcessId) -> ControlResult<SuspensionState> {
            const OPERATION: &str = "query";

            let Some(_process) = self.open_live_process(pid, OPERATION)? else {
                return Ok(SuspensionState::Unknown);
            };

            let mut suspended = 0usize;
            let mut running = 0usize;
            for tid in self.snapshot(pid, OPERATION)? {
                match probe_thread(tid) {
                    Ok(true) => suspended += 1,
                    Ok(false) => running += 1,
                    Err(ThreadOutcome::Denied) => {
                        return Err(ControlError::permission_denied(pid, OPERATION));
                    }
                    Err(ThreadOutcome::Failed(code)) => {
                        return Err(ControlError::os(pid, OPERATION, code));
                    }
                    // exited between snapshot and probe
                    Err(_) => {}
                }
            }

            let state = match (suspended, running) {
                (0, 0) => SuspensionState::Unknown,
                (_, 0) => SuspensionState::Suspended,
                (0, _) => SuspensionState::Running,
                _ => SuspensionState::Unknown,
            };
            debug!(pid = %pid, suspended, running, state = ?state, "Queried process state");
            Ok(state)
        }
    }

}

#[cfg(windows)]
pub use windows_impl::WindowsSuspensionDriver;

// Stub so the crate still builds on non-Windows hosts; the facade never selects it there
#[cfg(not(windows))]
pub struct WindowsSuspensionDriver;

#[cfg(not(windows))]
impl SuspensionDriver for WindowsSuspensionDriver {
    fn new(_config: &DriverConfig) -> Self {
        Self
    }

    fn exists(&self, pid: ProcessId) -> ControlResult<bool> {
        Err(ControlError::os(pid, "probe", ENOSYS))
    }

    fn set_suspended(&self, pid: ProcessId, _want_suspended: bool) -> ControlResult<Transition> {
        Err(ControlError::os(pid, "suspend", ENOSYS))
    }

    fn state(&self, pid: ProcessId) -> ControlResult<SuspensionState> {
        Err(ControlError::os(pid, "query", ENOSYS))
    }
}

#[cfg(not(windows))]
const ENOSYS: i32 = 38;
