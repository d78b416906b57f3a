use procfreeze_core::{DriverConfig, SuspensionDriverFactory};

/// Suspension driver of the build target
#[cfg(unix)]
pub type PlatformDriver = procfreeze_unix::UnixSuspensionDriver;

#[cfg(windows)]
pub type PlatformDriver = procfreeze_windows::WindowsSuspensionDriver;

#[cfg(not(any(unix, windows)))]
compile_error!("Unsupported platform: only Unix and Windows are currently supported");

/// Platform-independent factory that selects the appropriate implementation at compile time
pub struct PlatformSuspensionDriverFactory;

impl SuspensionDriverFactory for PlatformSuspensionDriverFactory {
    type Driver = PlatformDriver;

    fn create_driver(config: &DriverConfig) -> Self::Driver {
        #[cfg(unix)]
        return procfreeze_unix::UnixSuspensionDriverFactory::create_driver(config);

        #[cfg(windows)]
        return procfreeze_windows::WindowsSuspensionDriverFactory::create_driver(config);
    }

    fn platform_name() -> &'static str {
        #[cfg(unix)]
        return procfreeze_unix::UnixSuspensionDriverFactory::platform_name();

        #[cfg(windows)]
        return procfreeze_windows::WindowsSuspensionDriverFactory::platform_name();
    }
}
