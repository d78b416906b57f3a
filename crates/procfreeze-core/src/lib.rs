//! procfreeze core - Platform-independent process control abstractions
//!
//! This crate provides the suspension driver contract, the validated process
//! id type, the driver configuration and the error taxonomy shared by the
//! platform-specific drivers and the control facade.

pub mod config;
pub mod error;
pub mod process;

pub use config::*;
pub use error::*;
pub use process::*;
