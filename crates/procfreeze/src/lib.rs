//! procfreeze - suspend and resume processes by pid
//!
//! The facade exposes one synchronous contract on every platform:
//!
//! - [`process_exists`]: does a live process with this id exist right now
//! - [`set_suspended`]: move it to Suspended or Running
//!
//! The driver underneath is chosen at compile time. On Unix the kernel stops
//! and continues the whole process with `SIGSTOP` / `SIGCONT`. On Windows each
//! thread is suspended individually, so coverage of threads created during the
//! call is best-effort (see [`Coverage`]).
//!
//! ```rust,no_run
//! let pid = 1234;
//! if procfreeze::process_exists(pid) {
//!     match procfreeze::set_suspended(pid, true) {
//!         Ok(true) => println!("froze {pid}"),
//!         Ok(false) => println!("{pid} exited first"),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

mod control;
mod platform_factory;

pub use control::ProcessControl;
pub use platform_factory::{PlatformDriver, PlatformSuspensionDriverFactory};

// Re-export core functionality
pub use procfreeze_core::*;

/// Whether a live process with this id exists; invalid ids read as `false`
pub fn process_exists(pid: i64) -> bool {
    ProcessControl::new().process_exists(pid)
}

/// Like [`process_exists`], rejecting invalid ids and surfacing probe errors
pub fn try_process_exists(pid: i64) -> ControlResult<bool> {
    ProcessControl::new().try_process_exists(pid)
}

/// Suspend (`true`) or resume (`false`) a process
///
/// Returns `Ok(true)` when the transition was applied or already in effect and
/// `Ok(false)` when the process no longer exists.
pub fn set_suspended(pid: i64, want_suspended: bool) -> ControlResult<bool> {
    ProcessControl::new().set_suspended(pid, want_suspended)
}

/// Like [`set_suspended`], returning the thread coverage of the transition
pub fn set_suspended_with_report(pid: i64, want_suspended: bool) -> ControlResult<Transition> {
    ProcessControl::new().set_suspended_with_report(pid, want_suspended)
}

/// Current logical state of the process
pub fn suspension_state(pid: i64) -> ControlResult<SuspensionState> {
    ProcessControl::new().suspension_state(pid)
}

/// Name of the platform the driver was built for
pub fn platform_name() -> &'static str {
    PlatformSuspensionDriverFactory::platform_name()
}
