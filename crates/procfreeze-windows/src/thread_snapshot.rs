use crate::handle::OwnedHandle;
use crate::thread_passes::ThreadSet;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, TH32CS_SNAPTHREAD, THREADENTRY32, Thread32First, Thread32Next,
};

/// Snapshot the ids of all threads currently owned by `pid`
///
/// The ToolHelp thread snapshot covers the whole system; the owner filter is
/// applied here. A process that has exited simply yields an empty set.
pub(crate) fn snapshot_threads(pid: u32) -> windows::core::Result<ThreadSet> {
    // SAFETY: plain snapshot creation, the returned handle is owned below
    let snapshot = OwnedHandle::new(unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0)? });

    let mut entry = THREADENTRY32 {
        dwSize: std::mem::size_of::<THREADENTRY32>() as u32,
        ..Default::default()
    };
    let mut threads = ThreadSet::new();

    // SAFETY: `entry` is a properly sized THREADENTRY32 and the snapshot handle is open
    let mut next = unsafe { Thread32First(snapshot.raw(), &mut entry) };
    while next.is_ok() {
        if entry.th32OwnerProcessID == pid {
            threads.insert(entry.th32ThreadID);
        }
        // SAFETY: as above
        next = unsafe { Thread32Next(snapshot.raw(), &mut entry) };
    }

    Ok(threads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_contains_current_thread() {
        let threads = snapshot_threads(std::process::id()).unwrap();
        assert!(!threads.is_empty());

        let current = unsafe { windows::Win32::System::Threading::GetCurrentThreadId() };
        assert!(threads.contains(&current));
    }

    #[test]
    fn test_snapshot_sees_new_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        let worker = std::thread::spawn(move || {
            let tid = unsafe { windows::Win32::System::Threading::GetCurrentThreadId() };
            tx.send(tid).unwrap();
            let _ = done_rx.recv();
        });

        let tid = rx.recv().unwrap();
        let threads = snapshot_threads(std::process::id()).unwrap();
        assert!(threads.contains(&tid));

        done_tx.send(()).unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn test_snapshot_of_unused_pid_is_empty() {
        // Windows pids are multiples of four
        assert!(snapshot_threads(0xFFFF_FFF1).unwrap().is_empty());
    }
}
