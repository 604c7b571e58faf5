//! Bounded execution of collaborator subprocesses (`git push`, `npm publish`).

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{ReleaseError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `program args..` in `cwd`, killing it once `timeout` elapses.
///
/// Returns captured stdout. A non-zero exit status or an expired timeout
/// is an external-call error named after `operation`.
pub fn run_bounded(
    operation: &str,
    program: &str,
    args: &[String],
    cwd: &Path,
    timeout: Duration,
) -> Result<String> {
    debug!("running {} {:?} in {}", program, args, cwd.display());

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ReleaseError::external(operation, format!("failed to start {}: {}", program, e)))?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            // Reap the child so the pipes close and the readers finish.
            let _ = child.kill();
            let _ = child.wait();
            return Err(ReleaseError::timeout(operation, timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect(stdout);
    let stderr = collect(stderr);

    if !status.success() {
        return Err(ReleaseError::external(
            operation,
            format!(
                "exited with code {}\nStdout: {}\nStderr: {}",
                status.code().unwrap_or(-1),
                stdout.trim(),
                stderr.trim()
            ),
        ));
    }

    Ok(stdout)
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        let _ = reader.read_to_string(&mut buffer);
        buffer
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
