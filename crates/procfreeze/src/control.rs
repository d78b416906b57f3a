use crate::platform_factory::{PlatformDriver, PlatformSuspensionDriverFactory};
use procfreeze_core::{
    ControlResult, DriverConfig, ProcessId, SuspensionDriver, SuspensionDriverFactory,
    SuspensionState, Transition,
};
use tracing::{debug, warn};

/// Control facade over the platform suspension driver
///
/// Validates caller-supplied pids before any OS call and otherwise passes
/// driver results through unchanged. Holds no per-process state: every call
/// queries the OS afresh.
pub struct ProcessControl<D: SuspensionDriver = PlatformDriver> {
    driver: D,
}

impl ProcessControl<PlatformDriver> {
    /// Create a facade over the platform driver with default configuration
    pub fn new() -> Self {
        Self::with_driver(PlatformSuspensionDriverFactory::create_driver(
            &DriverConfig::default(),
        ))
    }

    /// Create a facade over the platform driver, rejecting invalid configuration
    pub fn with_config(config: DriverConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self::with_driver(
            PlatformSuspensionDriverFactory::create_driver(&config),
        ))
    }
}

impl Default for ProcessControl<PlatformDriver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: SuspensionDriver> ProcessControl<D> {
    pub fn with_driver(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Whether a live process with this id exists right now
    ///
    /// Invalid ids and probe failures both read as `false`; use
    /// [`try_process_exists`](Self::try_process_exists) to tell them apart.
    pub fn process_exists(&self, pid: i64) -> bool {
        match self.try_process_exists(pid) {
            Ok(exists) => exists,
            Err(e) => {
                warn!(pid, error = %e, "Process existence check failed");
                false
            }
        }
    }

    pub fn try_process_exists(&self, pid: i64) -> ControlResult<bool> {
        let pid = ProcessId::from_raw(pid)?;
        self.driver.exists(pid)
    }

    /// Suspend (`true`) or resume (`false`) a process
    ///
    /// `Ok(true)` when the transition was applied or already in effect,
    /// `Ok(false)` when the process is gone. No prior existence check is
    /// needed or performed.
    pub fn set_suspended(&self, pid: i64, want_suspended: bool) -> ControlResult<bool> {
        self.set_suspended_with_report(pid, want_suspended)
            .map(|transition| transition.applied)
    }

    /// Like [`set_suspended`](Self::set_suspended), keeping the coverage report
    pub fn set_suspended_with_report(
        &self,
        pid: i64,
        want_suspended: bool,
    ) -> ControlResult<Transition> {
        let pid = ProcessId::from_raw(pid)?;
        debug!(pid = %pid, want_suspended, "Setting process suspension");
        self.driver.set_suspended(pid, want_suspended)
    }

    pub fn suspension_state(&self, pid: i64) -> ControlResult<SuspensionState> {
        let pid = ProcessId::from_raw(pid)?;
        self.driver.state(pid)
    }
}
