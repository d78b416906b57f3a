use thiserror::Error;

/// Result alias used by drivers and the control facade
pub type ControlResult<T> = Result<T, ControlError>;

/// Error types for process control operations
///
/// A target that no longer exists is not an error: drivers report it as a
/// non-applied transition (`Ok(false)` at the facade).
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Invalid process id {pid}: {reason}")]
    InvalidArgument { pid: i64, reason: String },

    #[error("Permission denied: cannot {operation} process {pid}")]
    PermissionDenied { pid: i64, operation: &'static str },

    #[error("Failed to {operation} process {pid} (os error {code})")]
    Os {
        pid: i64,
        operation: &'static str,
        code: i32,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl ControlError {
    pub fn invalid_argument(pid: i64, reason: impl Into<String>) -> Self {
        ControlError::InvalidArgument {
            pid,
            reason: reason.into(),
        }
    }

    pub fn permission_denied(pid: impl Into<i64>, operation: &'static str) -> Self {
        ControlError::PermissionDenied {
            pid: pid.into(),
            operation,
        }
    }

    pub fn os(pid: impl Into<i64>, operation: &'static str, code: i32) -> Self {
        ControlError::Os {
            pid: pid.into(),
            operation,
            code,
        }
    }

    /// Check if this error indicates a permanent failure
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ControlError::InvalidArgument { .. }
                | ControlError::PermissionDenied { .. }
                | ControlError::Config(_)
        )
    }

    /// Native error code carried by an OS failure (errno, Win32 error or NTSTATUS)
    pub fn native_code(&self) -> Option<i32> {
        match self {
            ControlError::Os { code, .. } => Some(*code),
            _ => None,
        }
    }
}
