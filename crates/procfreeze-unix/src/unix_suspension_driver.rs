use procfreeze_core::{
    ControlError, ControlResult, DriverConfig, ProcessId, SuspensionDriver, SuspensionState,
    Transition,
};

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid as NixPid;
    use sysinfo::{ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
    use tracing::{debug, info, warn};

    /// Signal-based suspension driver
    ///
    /// The kernel stops and continues the whole process atomically, and
    /// `SIGSTOP` cannot be caught or ignored by the target, so there is no
    /// thread bookkeeping on this side and nothing in [`DriverConfig`] applies.
    #[derive(Debug, Default)]
    pub struct UnixSuspensionDriver;

    impl UnixSuspensionDriver {
        fn deliver(&self, pid: ProcessId, sig: Signal) -> ControlResult<Transition> {
            let operation = operation_name(sig);
            let nix_pid = NixPid::from_raw(pid.as_raw());

            match signal::kill(nix_pid, sig) {
                Ok(()) => {
                    info!(pid = %pid, signal = sig.as_str(), "Delivered signal to process");
                    Ok(Transition::applied())
                }
                // Exited before or while we signalled it: same outcome either way
                Err(Errno::ESRCH) => {
                    info!(pid = %pid, "Process not found (already exited)");
                    Ok(Transition::vanished())
                }
                Err(Errno::EPERM) => {
                    warn!(pid = %pid, "Permission denied to {} process", operation);
                    Err(ControlError::permission_denied(pid, operation))
                }
                Err(e) => {
                    warn!(pid = %pid, signal = sig.as_str(), error = %e, "Failed to signal process");
                    Err(ControlError::os(pid, operation, e as i32))
                }
            }
        }
    }

    fn operation_name(sig: Signal) -> &'static str {
        match sig {
            Signal::SIGSTOP => "suspend",
            Signal::SIGCONT => "resume",
            _ => "signal",
        }
    }

    impl SuspensionDriver for UnixSuspensionDriver {
        fn new(_config: &DriverConfig) -> Self {
            debug!("Initializing Unix suspension driver");
            Self
        }

        /// Zombies still answer the signal probe, so they count as existing
        /// here while [`state`](Self::state) reports them as `Unknown`
        fn exists(&self, pid: ProcessId) -> ControlResult<bool> {
            let nix_pid = NixPid::from_raw(pid.as_raw());

            // Signal 0 runs the existence and permission checks without delivering anything
            match signal::kill(nix_pid, None) {
                Ok(()) => Ok(true),
                Err(Errno::ESRCH) => Ok(false),
                // Exists, just not ours
                Err(Errno::EPERM) => Ok(true),
                Err(e) => Err(ControlError::os(pid, "probe", e as i32)),
            }
        }

        fn set_suspended(&self, pid: ProcessId, want_suspended: bool) -> ControlResult<Transition> {
            let sig = if want_suspended {
                Signal::SIGSTOP
            } else {
                Signal::SIGCONT
            };
            self.deliver(pid, sig)
        }

        fn state(&self, pid: ProcessId) -> ControlResult<SuspensionState> {
            let sys_pid = sysinfo::Pid::from_u32(pid.as_raw() as u32);
            let mut system = System::new();
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[sys_pid]),
                true,
                ProcessRefreshKind::default(),
            );

            let state = match system.process(sys_pid).map(|p| p.status()) {
                Some(ProcessStatus::Stop) => SuspensionState::Suspended,
                Some(ProcessStatus::Zombie | ProcessStatus::Dead | ProcessStatus::Unknown(_)) => {
                    SuspensionState::Unknown
                }
                Some(_) => SuspensionState::Running,
                None => SuspensionState::Unknown,
            };
            debug!(pid = %pid, state = ?state, "Queried process state");
            Ok(state)
        }
    }
}

#[cfg(unix)]
pub use unix_impl::UnixSuspensionDriver;

// Stub so the crate still builds on non-Unix hosts; the facade never selects it there
#[cfg(not(unix))]
pub struct UnixSuspensionDriver;

#[cfg(not(unix))]
impl SuspensionDriver for UnixSuspensionDriver {
    fn new(_config: &DriverConfig) -> Self {
        Self
    }

    fn exists(&self, pid: ProcessId) -> ControlResult<bool> {
        Err(ControlError::os(pid, "probe", UNSUPPORTED))
    }

    fn set_suspended(&self, pid: ProcessId, _want_suspended: bool) -> ControlResult<Transition> {
        Err(ControlError::os(pid, "signal", UNSUPPORTED))
    }

    fn state(&self, pid: ProcessId) -> ControlResult<SuspensionState> {
        Err(ControlError::os(pid, "query", UNSUPPORTED))
    }
}

// ERROR_NOT_SUPPORTED
#[cfg(not(unix))]
const UNSUPPORTED: i32 = 50;
