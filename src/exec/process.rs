// src/exec/process.rs

//! Spawning and draining one child process.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::ProcessError;
use crate::exec::outcome::{classify, CommandResult};

/// How long to wait for stdout/stderr readers after the child has exited.
///
/// A grandchild that inherited the pipes can keep them open after the
/// direct child is gone; we don't wait for it forever.
pub(crate) const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Spawn `argv[0]` with the remaining arguments.
///
/// stdout and stderr are always piped. The child is killed if its handle is
/// dropped, so no exit path can leave it running.
pub(crate) fn spawn(argv: &[String], stdin: Stdio) -> Result<Child, ProcessError> {
    let (program, args) = argv.split_first().ok_or_else(|| ProcessError::SpawnFailed {
        program: String::new(),
        reason: "empty command line".to_string(),
    })?;

    Command::new(program)
        .args(args)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProcessError::SpawnFailed {
            program: program.clone(),
            reason: e.to_string(),
        })
}

/// Read a pipe to the end on a background task.
pub(crate) fn spawn_reader<R>(stream: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            if let Err(e) = stream.read_to_end(&mut buf).await {
                debug!(error = %e, "pipe read ended with error");
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Collect a reader's output, giving up after [`DRAIN_GRACE`].
pub(crate) async fn join_reader(handle: JoinHandle<String>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, handle).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(error = %e, "pipe reader task failed");
            String::new()
        }
        Err(_) => {
            warn!("pipe still open after child exit; output truncated");
            String::new()
        }
    }
}

/// Kill the child and reap it so it does not linger as a zombie.
pub(crate) async fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill child process");
    }
}

/// Run a command to completion and classify its output.
///
/// Spawn failures and timeouts are reported as
/// [`CommandResult::FailedCommand`].
pub async fn run_command(argv: &[String], timeout: Duration) -> CommandResult {
    match run_command_inner(argv, timeout).await {
        Ok(result) => result,
        Err(err) => {
            warn!(cmd = ?argv, error = %err, "command did not complete");
            CommandResult::FailedCommand(err.to_string())
        }
    }
}

async fn run_command_inner(
    argv: &[String],
    timeout: Duration,
) -> Result<CommandResult, ProcessError> {
    info!(cmd = ?argv, "starting command");

    let mut child = spawn(argv, Stdio::null())?;
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            kill_and_reap(&mut child).await;
            return Err(ProcessError::SpawnFailed {
                program: argv[0].clone(),
                reason: format!("waiting for exit: {e}"),
            });
        }
        Err(_) => {
            kill_and_reap(&mut child).await;
            stdout.abort();
            stderr.abort();
            return Err(ProcessError::Timeout { after: timeout });
        }
    };

    let stdout = join_reader(stdout).await;
    let stderr = join_reader(stderr).await;

    info!(
        cmd = ?argv,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "command exited"
    );
    debug!(stdout = %stdout.trim(), stderr = %stderr.trim(), "command output");

    Ok(classify(status.success(), &stdout, &stderr))
}
