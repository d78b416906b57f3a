//! Unix-specific suspension driver: whole-process stop/continue signals

mod unix_suspension_driver;

use procfreeze_core::{DriverConfig, SuspensionDriver, SuspensionDriverFactory};

pub use unix_suspension_driver::UnixSuspensionDriver;

/// Unix-specific suspension driver factory
pub struct UnixSuspensionDriverFactory;

impl SuspensionDriverFactory for UnixSuspensionDriverFactory {
    type Driver = UnixSuspensionDriver;

    fn create_driver(config: &DriverConfig) -> Self::Driver {
        UnixSuspensionDriver::new(config)
    }

    fn platform_name() -> &'static str {
        "unix"
    }
}
