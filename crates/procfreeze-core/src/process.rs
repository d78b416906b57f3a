use crate::config::DriverConfig;
use crate::error::{ControlError, ControlResult};
use std::fmt;

/// Native process identifier type of the host
///
/// `pid_t` is signed on Unix, `DWORD` is unsigned on Windows.
#[cfg(not(windows))]
pub type NativePid = i32;
#[cfg(windows)]
pub type NativePid = u32;

/// A validated process identifier in the host's native width
///
/// Only constructible through [`ProcessId::from_raw`], so holding one means the
/// value is positive and fits the native pid type. It identifies a process at
/// call time only: the OS may reuse the number for an unrelated process later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(NativePid);

impl ProcessId {
    /// Validate a caller-supplied pid
    pub fn from_raw(raw: i64) -> ControlResult<Self> {
        if raw <= 0 {
            return Err(ControlError::invalid_argument(raw, "must be a positive integer"));
        }

        NativePid::try_from(raw).map(ProcessId).map_err(|_| {
            ControlError::invalid_argument(raw, "out of range for the native process id type")
        })
    }

    pub fn as_raw(self) -> NativePid {
        self.0
    }
}

impl From<ProcessId> for i64 {
    fn from(pid: ProcessId) -> Self {
        i64::from(pid.0)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical scheduling state of a process, always derived freshly from the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionState {
    Running,
    Suspended,
    /// The process is gone, is a zombie, or its threads disagree
    Unknown,
}

/// How much of the target a successful transition covered
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Coverage {
    /// Every thread observed (or the whole process) was transitioned
    #[default]
    Complete,
    /// Applied, but not transactionally: some threads appeared after the last
    /// reconciliation round or could not be transitioned
    BestEffort { unreconciled: usize, failed: usize },
}

/// Outcome of a `set_suspended` call that did not fail fatally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// False when the target vanished before or during the operation
    pub applied: bool,
    pub coverage: Coverage,
}

impl Transition {
    pub fn applied() -> Self {
        Self {
            applied: true,
            coverage: Coverage::Complete,
        }
    }

    pub fn best_effort(unreconciled: usize, failed: usize) -> Self {
        if unreconciled == 0 && failed == 0 {
            return Self::applied();
        }
        Self {
            applied: true,
            coverage: Coverage::BestEffort {
                unreconciled,
                failed,
            },
        }
    }

    pub fn vanished() -> Self {
        Self {
            applied: false,
            coverage: Coverage::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.coverage == Coverage::Complete
    }
}

/// Platform suspension driver contract
///
/// One implementation exists per operating-system family. Every method is
/// synchronous and acquires whatever OS handles it needs for the duration of
/// the call only.
///
/// # Implementation Notes
///
/// Implementations should:
/// - Report a target that does not exist as `Ok(false)` / a vanished
///   [`Transition`], never as an error
/// - Surface permission failures as [`ControlError::PermissionDenied`] and every
///   other native failure as [`ControlError::Os`] with the native code
/// - Treat "exists but inaccessible" as existing
pub trait SuspensionDriver: Send + Sync {
    /// Create a new driver instance with the given configuration
    fn new(config: &DriverConfig) -> Self
    where
        Self: Sized;

    /// Check whether a live process with this id exists right now
    fn exists(&self, pid: ProcessId) -> ControlResult<bool>;

    /// Transition the process to Suspended (`true`) or Running (`false`)
    ///
    /// Re-issuing a transition that is already in effect succeeds.
    fn set_suspended(&self, pid: ProcessId, want_suspended: bool) -> ControlResult<Transition>;

    /// Query the current logical state of the process
    fn state(&self, pid: ProcessId) -> ControlResult<SuspensionState>;
}

/// Factory trait for creating platform-specific suspension drivers
pub trait SuspensionDriverFactory {
    /// The type of driver this factory creates
    type Driver: SuspensionDriver;

    /// Create a driver for the current platform
    fn create_driver(config: &DriverConfig) -> Self::Driver;

    /// Get the platform name for logging and debugging
    fn platform_name() -> &'static str;
}
