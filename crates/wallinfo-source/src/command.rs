use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::Error;

/// Run `command` through the platform shell and capture its stdout.
///
/// The child is spawned with `kill_on_drop`, so when the time budget
/// runs out the pending wait is dropped and the process is killed. A
/// non-zero exit status is logged but still yields whatever was printed.
pub(crate) async fn run(command: &str, timeout: Duration) -> Result<String, Error> {
    debug!(command, "running command source");

    let child = shell(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Error::Command {
            command: command.to_owned(),
            source,
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| Error::Command {
            command: command.to_owned(),
            source,
        })?,
        Err(_) => {
            warn!(command, budget = ?timeout, "command timed out, killed");
            return Err(Error::timeout(timeout));
        }
    };

    if !output.status.success() {
        warn!(
            command,
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "command exited unsuccessfully"
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}
