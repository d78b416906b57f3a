//! Thread-set bookkeeping for per-thread suspension, independent of the OS calls
//!
//! The driver plugs its snapshot and suspend primitives in as closures, which
//! keeps the round accounting testable on any host.

use std::collections::BTreeSet;
use tracing::debug;

/// Thread ids owned by a process at one instant
pub(crate) type ThreadSet = BTreeSet<u32>;

/// Run up to `rounds` reconciliation rounds after the first suspend pass
///
/// Each round re-snapshots the process and transitions every thread not yet in
/// `attempted`. Stops early once a snapshot shows nothing new. Returns how many
/// threads exist that were never attempted; that count needs one more snapshot
/// unless a round settled.
pub(crate) fn reconcile<E>(
    attempted: &mut ThreadSet,
    rounds: u32,
    mut snapshot: impl FnMut() -> Result<ThreadSet, E>,
    mut transition: impl FnMut(u32),
) -> Result<usize, E> {
    for round in 1..=rounds {
        let current = snapshot()?;
        let fresh: Vec<u32> = current.difference(attempted).copied().collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        debug!(round, fresh = fresh.len(), "Reconciling new threads");
        for &tid in &fresh {
            transition(tid);
        }
        attempted.extend(fresh);
    }

    Ok(snapshot()?.difference(attempted).count())
}

/// Resume one thread until its suspend count reaches zero
///
/// `resume` returns the count before each call. `Ok(false)` means the thread
/// was still suspended after `max_passes` calls.
pub(crate) fn resume_until_running<E>(
    max_passes: u32,
    mut resume: impl FnMut() -> Result<u32, E>,
) -> Result<bool, E> {
    for _ in 0..max_passes {
        if resume()? <= 1 {
            return Ok(true);
        }
    }
    Ok(false)
}
