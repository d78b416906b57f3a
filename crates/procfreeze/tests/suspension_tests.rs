use procfreeze::{ControlError, ProcessControl, SuspensionState};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const COUNTER_FILE_ENV: &str = "PROCFREEZE_COUNTER_FILE";
const THREAD_CHURN_ENV: &str = "PROCFREEZE_THREAD_CHURN";

static NEXT_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Child process spawned from this test binary, killed and reaped on drop
struct Helper {
    child: Child,
    counter_file: Option<PathBuf>,
}

impl Helper {
    fn spawn(test_name: &str, env: (&str, &str), counter_file: Option<PathBuf>) -> Self {
        let child = Command::new(std::env::current_exe().unwrap())
            .args([test_name, "--exact", "--ignored", "--nocapture"])
            .env(env.0, env.1)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        Self {
            child,
            counter_file,
        }
    }

    fn counter() -> Self {
        let path = std::env::temp_dir().join(format!(
            "procfreeze-counter-{}-{}",
            std::process::id(),
            NEXT_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_string_lossy().into_owned();
        let helper = Self::spawn(
            "child_counter",
            (COUNTER_FILE_ENV, path_str.as_str()),
            Some(path),
        );
        helper.wait_for_first_count();
        helper
    }

    fn pid(&self) -> i64 {
        i64::from(self.child.id())
    }

    fn read_count(&self) -> String {
        let path = self.counter_file.as_ref().unwrap();
        std::fs::read_to_string(path).unwrap_or_default()
    }

    fn wait_for_first_count(&self) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while self.read_count().is_empty() {
            assert!(Instant::now() < deadline, "counter child never started");
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}

impl Drop for Helper {
    fn drop(&mut self) {
        let _ = procfreeze::set_suspended(self.pid(), false);
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(path) = &self.counter_file {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn wait_for_state(pid: i64, expected: SuspensionState) -> SuspensionState {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let state = procfreeze::suspension_state(pid).unwrap();
        if state == expected || Instant::now() > deadline {
            return state;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Pid of a process that has exited and been reaped
fn reaped_pid() -> i64 {
    let mut helper = Helper::spawn("child_counter", ("PROCFREEZE_UNUSED", "1"), None);
    helper.child.wait().unwrap();
    helper.pid()
}

#[test]
#[ignore = "spawned as a child process by the suspension tests"]
fn child_counter() {
    let Some(path) = std::env::var_os(COUNTER_FILE_ENV) else {
        return;
    };
    let mut count: u64 = 0;
    loop {
        count += 1;
        let _ = std::fs::write(&path, count.to_string());
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
#[ignore = "spawned as a child process by the suspension tests"]
fn child_thread_churn() {
    if std::env::var_os(THREAD_CHURN_ENV).is_none() {
        return;
    }
    loop {
        let workers: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| std::thread::sleep(Duration::from_millis(1))))
            .collect();
        for worker in workers {
            let _ = worker.join();
        }
    }
}

#[test]
fn test_counter_stops_while_suspended() {
    init_tracing();
    let helper = Helper::counter();
    let pid = helper.pid();

    assert!(procfreeze::process_exists(pid));
    assert!(procfreeze::set_suspended(pid, true).unwrap());
    assert_eq!(
        wait_for_state(pid, SuspensionState::Suspended),
        SuspensionState::Suspended
    );

    let before = helper.read_count();
    std::thread::sleep(Duration::from_millis(200));
    let after = helper.read_count();
    assert_eq!(before, after, "counter advanced while suspended");

    assert!(procfreeze::set_suspended(pid, false).unwrap());
    std::thread::sleep(Duration::from_millis(200));
    assert_ne!(after, helper.read_count(), "counter did not resume");
}

#[test]
fn test_suspend_twice_then_resume_once() {
    init_tracing();
    let helper = Helper::counter();
    let pid = helper.pid();

    assert!(procfreeze::set_suspended(pid, true).unwrap());
    assert!(procfreeze::set_suspended(pid, true).unwrap());
    assert_eq!(
        wait_for_state(pid, SuspensionState::Suspended),
        SuspensionState::Suspended
    );

    assert!(procfreeze::set_suspended(pid, false).unwrap());
    assert_eq!(
        wait_for_state(pid, SuspensionState::Running),
        SuspensionState::Running
    );
}

#[test]
fn test_resume_twice_is_harmless() {
    init_tracing();
    let helper = Helper::counter();
    let pid = helper.pid();

    assert!(procfreeze::set_suspended(pid, false).unwrap());
    assert!(procfreeze::set_suspended(pid, false).unwrap());
    assert_eq!(procfreeze::suspension_state(pid).unwrap(), SuspensionState::Running);
}

#[test]
fn test_missing_process() {
    init_tracing();
    let pid = reaped_pid();

    assert!(!procfreeze::process_exists(pid));
    assert!(!procfreeze::try_process_exists(pid).unwrap());
    assert!(!procfreeze::set_suspended(pid, true).unwrap());
    assert!(!procfreeze::set_suspended(pid, false).unwrap());
    assert_eq!(procfreeze::suspension_state(pid).unwrap(), SuspensionState::Unknown);
}

#[test]
fn test_invalid_pids() {
    for pid in [0, -1, -12345] {
        assert!(!procfreeze::process_exists(pid));
        assert!(matches!(
            procfreeze::set_suspended(pid, true),
            Err(ControlError::InvalidArgument { .. })
        ));
    }
}

#[test]
fn test_report_marks_transition_applied() {
    init_tracing();
    let helper = Helper::counter();
    let control = ProcessControl::new();

    let transition = control.set_suspended_with_report(helper.pid(), true).unwrap();
    assert!(transition.applied);
    // The kernel stops the whole process at once
    #[cfg(unix)]
    assert!(transition.is_complete());
    assert!(control.set_suspended(helper.pid(), false).unwrap());
}

#[cfg(windows)]
#[test]
fn test_thread_churn_is_fully_suspended() {
    use procfreeze::{Coverage, DriverConfig};

    init_tracing();
    let helper = Helper::spawn("child_thread_churn", (THREAD_CHURN_ENV, "1"), None);
    let pid = helper.pid();
    std::thread::sleep(Duration::from_millis(300));

    let control = ProcessControl::with_config(DriverConfig::strict()).unwrap();
    let transition = control.set_suspended_with_report(pid, true).unwrap();
    assert!(transition.applied);

    // The spawning thread is frozen in the first pass, so reconciliation settles
    match transition.coverage {
        Coverage::Complete => {}
        Coverage::BestEffort { unreconciled, .. } => assert_eq!(unreconciled, 0),
    }
    assert_eq!(control.suspension_state(pid).unwrap(), SuspensionState::Suspended);

    assert!(control.set_suspended(pid, false).unwrap());
    assert_eq!(
        wait_for_state(pid, SuspensionState::Running),
        SuspensionState::Running
    );
}
