use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::ToolchainConfig;

use super::{CompilationResult, ExecutionError, apply_template};

const COMPILE_OUTPUT_FILE: &str = "compile_output.txt";

/// Stages the source text into the workspace and invokes the external
/// compiler against it.
///
/// Stdout and stderr are redirected into one file handle, so the returned
/// output carries diagnostics on failure and warnings on success alike.
/// Interleaving between the two streams is best-effort.
pub async fn compile(
    source_code: &str,
    workspace_dir: &Path,
    toolchain: &ToolchainConfig,
) -> Result<CompilationResult, ExecutionError> {
    let source_path = workspace_dir.join(&toolchain.source_file);
    fs::write(&source_path, source_code)?;

    let workspace_str = workspace_dir.to_string_lossy();
    let source_str = source_path.to_string_lossy();
    let mut mapping = HashMap::<&str, &str>::new();
    mapping.insert("%WORKDIR%", &workspace_str);
    mapping.insert("%SOURCE%", &source_str);
    mapping.insert("%ENTRY%", &toolchain.entry_point);

    let command = apply_template(&toolchain.compile_command, &mapping);
    if command.is_empty() {
        return Err(ExecutionError::ToolchainUnavailable(
            "compile command is empty".to_string(),
        ));
    }

    let output_path = workspace_dir.join(COMPILE_OUTPUT_FILE);
    let output_file = fs::File::create(&output_path)?;

    let mut cmd = Command::new(&command[0]);
    cmd.args(&command[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::from(output_file.try_clone()?))
        .stderr(Stdio::from(output_file))
        .current_dir(workspace_dir);

    let status = match cmd.status().await {
        Ok(status) => status,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ExecutionError::ToolchainUnavailable(command[0].clone()));
        }
        Err(e) => return Err(e.into()),
    };

    let output = fs::read_to_string(&output_path).unwrap_or_default();

    Ok(CompilationResult {
        success: status.success(),
        output,
    })
}
