use windows::Win32::Foundation::{CloseHandle, HANDLE};

/// Kernel handle closed when dropped
///
/// Every process, thread and snapshot handle the driver opens lives in one of
/// these, so it is released on every exit path of the call that opened it.
pub(crate) struct OwnedHandle(HANDLE);

impl OwnedHandle {
    pub(crate) fn new(handle: HANDLE) -> Self {
        Self(handle)
    }

    pub(crate) fn raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            // SAFETY: the handle was returned by a successful open call and is closed exactly once
            let _ = unsafe { CloseHandle(self.0) };
        }
    }
}
