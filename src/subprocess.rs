//! Runs a command with a wall-clock timeout, guaranteeing the child is
//! reaped whether it finishes, times out, or errors.
//!
//! A reader thread drains the child's stdout while the caller polls for
//! exit with a bounded wait, and signals escalate from graceful termination
//! to a force-kill on timeout.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Output buffers are bounded so a runaway command can't grow memory
/// without limit; excess bytes are drained and discarded so the child
/// never blocks writing to a full pipe.
pub const SUBPROCESS_OUTPUT_MAX: usize = 4096;

const KILL_GRACE: Duration = Duration::from_millis(100);
const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone)]
pub struct SubprocessOutput {
    pub exit_status: Option<i32>,
    pub timed_out: bool,
    pub stdout: String,
}

impl SubprocessOutput {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_status == Some(0)
    }
}

/// Runs `cmd_string` via `/bin/sh -c`, capturing stdout and discarding
/// stderr, bounded to `timeout`.
pub fn run(cmd_string: &str, timeout: Duration) -> std::io::Result<SubprocessOutput> {
    let mut command = Command::new("/bin/sh");
    command.arg("-c").arg(cmd_string);
    run_command(command, timeout)
}

/// Runs `git -C <dir> <args>` directly (no shell), stderr discarded. Never
/// calls `chdir()`, so it's safe to invoke from any thread — see spec's
/// concurrency notes on the git status provider.
pub fn run_in_dir(dir: &std::path::Path, args: &[&str], timeout: Duration) -> std::io::Result<SubprocessOutput> {
    let mut command = Command::new("git");
    command.arg("-C").arg(dir).args(args);
    run_command(command, timeout)
}

fn run_command(mut command: Command, timeout: Duration) -> std::io::Result<SubprocessOutput> {
    command.stdout(Stdio::piped()).stderr(Stdio::null()).stdin(Stdio::null());

    let mut child = command.spawn()?;
    let stdout = child.stdout.take();
    let (tx, rx) = mpsc::channel::<Vec<u8>>();

    if let Some(mut pipe) = stdout {
        thread::Builder::new()
            .name("promptweave-subprocess-reader".into())
            .spawn(move || {
                let mut captured = Vec::with_capacity(SUBPROCESS_OUTPUT_MAX);
                let mut chunk = [0u8; 256];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => {
                            if captured.len() < SUBPROCESS_OUTPUT_MAX {
                                let take = (SUBPROCESS_OUTPUT_MAX - captured.len()).min(n);
                                captured.extend_from_slice(&chunk[..take]);
                            }
                            // Anything beyond SUBPROCESS_OUTPUT_MAX is read and
                            // dropped so the child's write() never blocks.
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
                let _ = tx.send(captured);
            })
            .expect("failed to spawn subprocess reader thread");
    } else {
        let _ = tx.send(Vec::new());
    }

    let deadline = Instant::now() + timeout;
    let (exit_status, timed_out) = poll_until_exit(&mut child, deadline);

    let captured = rx.recv_timeout(Duration::from_millis(500)).unwrap_or_default();
    let stdout = clean_output(&captured);

    Ok(SubprocessOutput { exit_status, timed_out, stdout })
}

fn poll_until_exit(child: &mut Child, deadline: Instant) -> (Option<i32>, bool) {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (status.code(), false),
            Ok(None) => {}
            Err(_) => return (None, false),
        }
        if Instant::now() >= deadline {
            log::warn!("subprocess exceeded its timeout, terminating");
            terminate_then_kill(child);
            let status = child.wait().ok().and_then(|s| s.code());
            return (status, true);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn terminate_then_kill(child: &mut Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(child.id() as i32);
    let _ = kill(pid, Signal::SIGTERM);
    thread::sleep(KILL_GRACE);
    if matches!(child.try_wait(), Ok(None)) {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn terminate_then_kill(child: &mut Child) {
    thread::sleep(KILL_GRACE);
    if matches!(child.try_wait(), Ok(None)) {
        let _ = child.kill();
    }
}

/// NUL-terminates conceptually (we return an owned `String`, so there's no
/// literal NUL byte to manage) and strips trailing CR/LF, matching what a
/// C-style fixed buffer API would hand back.
fn clean_output(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes).into_owned();
    text.trim_end_matches(['\r', '\n']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_strips_trailing_newline() {
        let out = run("echo hello", Duration::from_secs(5)).unwrap();
        assert_eq!(out.stdout, "hello");
        assert!(out.succeeded());
    }

    #[test]
    fn stderr_is_discarded() {
        let out = run("echo oops 1>&2", Duration::from_secs(5)).unwrap();
        assert_eq!(out.stdout, "");
        assert!(out.succeeded());
    }

    #[test]
    fn nonzero_exit_is_reported_without_erroring() {
        let out = run("exit 7", Duration::from_secs(5)).unwrap();
        assert_eq!(out.exit_status, Some(7));
        assert!(!out.succeeded());
    }

    #[test]
    fn timeout_kills_and_reaps_the_child() {
        let out = run("sleep 5", Duration::from_millis(100)).unwrap();
        assert!(out.timed_out);
        assert!(!out.succeeded());
    }

    #[test]
    fn overflowing_output_is_truncated_not_blocked() {
        let out = run("yes | head -c 1000000", Duration::from_secs(5)).unwrap();
        assert!(out.stdout.len() <= SUBPROCESS_OUTPUT_MAX);
        assert!(!out.timed_out);
    }
}
