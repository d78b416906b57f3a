//! Per-thread suspend primitives from `ntdll`
//!
//! Unlike `SuspendThread`, these report a proper NTSTATUS alongside the
//! previous suspend count. Callers only see the safe wrappers below.

use crate::handle::OwnedHandle;
use ntapi::ntpsapi::{NtResumeThread, NtSuspendThread};
use windows::Win32::Foundation::NTSTATUS;

pub(crate) const STATUS_ACCESS_DENIED: NTSTATUS = NTSTATUS(0xC000_0022_u32 as i32);
pub(crate) const STATUS_THREAD_IS_TERMINATING: NTSTATUS = NTSTATUS(0xC000_004B_u32 as i32);
pub(crate) const STATUS_SUSPEND_COUNT_EXCEEDED: NTSTATUS = NTSTATUS(0xC000_004A_u32 as i32);

fn check(status: i32, previous: u32) -> Result<u32, NTSTATUS> {
    let status = NTSTATUS(status);
    if status.is_ok() {
        Ok(previous)
    } else {
        Err(status)
    }
}

/// Increment the thread's suspend count, returning the count before the call
pub(crate) fn suspend_thread(thread: &OwnedHandle) -> Result<u32, NTSTATUS> {
    let mut previous = 0u32;
    // SAFETY: `thread` is an open handle with THREAD_SUSPEND_RESUME access for the whole call
    let status = unsafe { NtSuspendThread(thread.raw().0 as _, &mut previous) };
    check(status, previous)
}

/// Decrement the thread's suspend count, returning the count before the call
pub(crate) fn resume_thread(thread: &OwnedHandle) -> Result<u32, NTSTATUS> {
    let mut previous = 0u32;
    // SAFETY: see `suspend_thread`
    let status = unsafe { NtResumeThread(thread.raw().0 as _, &mut previous) };
    check(status, previous)
}
