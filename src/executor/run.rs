use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::ToolchainConfig;

use super::{ExecutionError, RunResult, apply_template};

/// Spawns the compiled entry point with the workspace as its working
/// directory and races its exit against the wall-clock limit.
///
/// Both output pipes are drained on a separate task while we wait, so a
/// child that produces more than an OS pipe buffer of output before
/// pausing cannot deadlock the stage. On timeout the child is killed
/// outright and the drain task is abandoned.
pub async fn run(
    workspace_dir: &Path,
    toolchain: &ToolchainConfig,
    time_limit: Duration,
) -> Result<RunResult, ExecutionError> {
    let workspace_str = workspace_dir.to_string_lossy();
    let mut mapping = HashMap::<&str, &str>::new();
    mapping.insert("%WORKDIR%", &workspace_str);
    mapping.insert("%ENTRY%", &toolchain.entry_point);

    let command = apply_template(&toolchain.run_command, &mapping);
    if command.is_empty() {
        return Err(ExecutionError::ToolchainUnavailable(
            "run command is empty".to_string(),
        ));
    }

    let mut cmd = Command::new(&command[0]);
    cmd.args(&command[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .current_dir(workspace_dir)
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ExecutionError::ToolchainUnavailable(command[0].clone()));
        }
        Err(e) => return Err(e.into()),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let drain = tokio::spawn(async move {
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();
        let read_out = async {
            if let Some(mut pipe) = stdout {
                let _ = pipe.read_to_end(&mut out_buf).await;
            }
        };
        let read_err = async {
            if let Some(mut pipe) = stderr {
                let _ = pipe.read_to_end(&mut err_buf).await;
            }
        };
        tokio::join!(read_out, read_err);
        combine_streams(&out_buf, &err_buf)
    });

    let status = match timeout(time_limit, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            drain.abort();
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill timed-out child process: {e}");
            }
            return Err(ExecutionError::Timeout {
                seconds: time_limit.as_secs(),
            });
        }
    };

    // The pipes reach EOF once the child is gone, so this join is bounded
    let output = match drain.await {
        Ok(output) => output,
        Err(e) => {
            log::error!("Output capture task failed: {e}");
            String::new()
        }
    };

    if !status.success() {
        log::debug!("Program exited with {status}, surfaced through its output only");
    }

    Ok(RunResult {
        success: true,
        output,
    })
}

/// Joins captured stdout and stderr into one text blob, stderr last
fn combine_streams(out_buf: &[u8], err_buf: &[u8]) -> String {
    let mut output = String::from_utf8_lossy(out_buf).into_owned();
    if !err_buf.is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&String::from_utf8_lossy(err_buf));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Workspace, compile};
    use std::time::Instant;

    fn sh_toolchain() -> ToolchainConfig {
        ToolchainConfig {
            source_file: "Main.sh".to_string(),
            entry_point: "Main.sh".to_string(),
            compile_command: vec!["sh".into(), "-n".into(), "%SOURCE%".into()],
            run_command: vec!["sh".into(), "%ENTRY%".into()],
        }
    }

    async fn stage(source: &str, workspace: &Workspace, toolchain: &ToolchainConfig) {
        let compilation = compile(source, workspace.path(), toolchain).await.unwrap();
        assert!(compilation.success);
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        let toolchain = sh_toolchain();
        let workspace = Workspace::acquire(200).unwrap();
        stage("echo \"Hello, World\"", &workspace, &toolchain).await;

        let result = run(workspace.path(), &toolchain, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "Hello, World\n");
    }

    #[tokio::test]
    async fn test_run_combines_stderr_after_stdout() {
        let toolchain = sh_toolchain();
        let workspace = Workspace::acquire(201).unwrap();
        stage("echo to-out; echo to-err >&2", &workspace, &toolchain).await;

        let result = run(workspace.path(), &toolchain, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(result.output.contains("to-out"));
        assert!(result.output.contains("to-err"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_a_stage_failure() {
        let toolchain = sh_toolchain();
        let workspace = Workspace::acquire(202).unwrap();
        stage("echo before-exit; exit 3", &workspace, &toolchain).await;

        let result = run(workspace.path(), &toolchain, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "before-exit\n");
    }

    #[tokio::test]
    async fn test_chatty_child_does_not_deadlock() {
        let toolchain = sh_toolchain();
        let workspace = Workspace::acquire(203).unwrap();
        // ~400 KB of output, several times any OS pipe buffer
        stage(
            "i=0\nwhile [ $i -lt 10000 ]; do echo 0123456789012345678901234567890123456789; i=$((i+1)); done",
            &workspace,
            &toolchain,
        )
        .await;

        let result = run(workspace.path(), &toolchain, Duration::from_secs(10))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output.lines().count(), 10000);
    }

    #[tokio::test]
    async fn test_timeout_kills_the_child() {
        let toolchain = sh_toolchain();
        let workspace = Workspace::acquire(204).unwrap();
        let sentinel = std::env::temp_dir().join(format!(
            "aula_run_sentinel_{}_{}",
            std::process::id(),
            line!()
        ));
        let _ = std::fs::remove_file(&sentinel);
        stage(
            &format!("sleep 3\ntouch {}", sentinel.display()),
            &workspace,
            &toolchain,
        )
        .await;

        let start = Instant::now();
        let result = run(workspace.path(), &toolchain, Duration::from_secs(1)).await;

        assert!(matches!(result, Err(ExecutionError::Timeout { seconds: 1 })));
        assert!(start.elapsed() < Duration::from_secs(3));

        // If the kill had not landed, the sentinel would appear after 3s
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(!sentinel.exists());
    }

    #[test]
    fn test_combine_streams() {
        assert_eq!(combine_streams(b"out\n", b"err\n"), "out\nerr\n");
        assert_eq!(combine_streams(b"out", b"err\n"), "out\nerr\n");
        assert_eq!(combine_streams(b"out\n", b""), "out\n");
        assert_eq!(combine_streams(b"", b"err\n"), "err\n");
    }
}
