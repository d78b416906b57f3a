//! Windows-specific suspension driver: per-thread suspension with bounded reconciliation

#[cfg(windows)]
mod handle;
#[cfg(windows)]
mod ntdll;
#[cfg_attr(not(windows), allow(dead_code))]
mod thread_passes;
#[cfg(windows)]
mod thread_snapshot;
mod windows_suspension_driver;

use procfreeze_core::{DriverConfig, SuspensionDriver, SuspensionDriverFactory};

pub use windows_suspension_driver::WindowsSuspensionDriver;

/// Windows-specific suspension driver factory
pub struct WindowsSuspensionDriverFactory;

impl SuspensionDriverFactory for WindowsSuspensionDriverFactory {
    type Driver = WindowsSuspensionDriver;

    fn create_driver(config: &DriverConfig) -> Self::Driver {
        WindowsSuspensionDriver::new(config)
    }

    fn platform_name() -> &'static str {
        "windows"
    }
}
