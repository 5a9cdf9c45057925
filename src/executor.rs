mod compile;
mod error;
mod run;
mod workspace;

pub use compile::compile;
pub use error::ExecutionError;
pub use run::run;
pub use workspace::Workspace;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

use crate::config::{ExecutionConfig, ToolchainConfig};
use crate::database as db;

/// Result of the compile stage
#[derive(Debug)]
pub struct CompilationResult {
    pub success: bool,
    pub output: String,
}

/// Result of the run stage
///
/// `success` is true whenever the program exits on its own inside the time
/// limit, regardless of its exit code. A non-zero exit is the submitted
/// program's own business, surfaced only through the captured output.
#[derive(Debug)]
pub struct RunResult {
    pub success: bool,
    pub output: String,
}

/// Response body for one execution invocation
///
/// `execution_output` is `None` when compilation failed and the run stage
/// was never entered.
#[derive(Serialize, Debug)]
pub struct ExecutionResponse {
    pub success: bool,
    pub compilation_output: String,
    pub execution_output: Option<String>,
}

/// Compiles and runs the stored program with the given id.
///
/// Stages: fetch the program record, stage its source into a fresh
/// workspace, compile, and run only if compilation succeeded. A compile
/// failure is a normal outcome (`success: false` response); a missing
/// program, a missing toolchain and a run timeout are typed errors. The
/// workspace is removed on every exit path.
pub async fn execute_program(
    program_id: i64,
    pool: Arc<SqlitePool>,
    toolchain: &ToolchainConfig,
    execution: &ExecutionConfig,
) -> Result<ExecutionResponse, ExecutionError> {
    let program = match db::fetch_program(program_id, pool).await {
        Ok(program) => program,
        Err(sqlx::Error::RowNotFound) => {
            return Err(ExecutionError::ProgramNotFound(program_id));
        }
        Err(e) => return Err(e.into()),
    };

    // Dropped on every return path below, taking the staged files with it
    let workspace = Workspace::acquire(program_id)?;

    let compilation = compile(&program.source_code, workspace.path(), toolchain).await?;
    if !compilation.success {
        log::warn!("Compilation failed for program {program_id}");
        return Ok(ExecutionResponse {
            success: false,
            compilation_output: compilation.output,
            execution_output: None,
        });
    }

    let time_limit = Duration::from_secs(execution.run_timeout_seconds);
    let run_result = run(workspace.path(), toolchain, time_limit).await?;

    log::info!("Program {program_id} executed successfully");
    Ok(ExecutionResponse {
        success: true,
        compilation_output: compilation.output,
        execution_output: Some(run_result.output),
    })
}

/// Applies placeholder substitutions to a command template
fn apply_template(template: &[String], mapping: &HashMap<&str, &str>) -> Vec<String> {
    template
        .iter()
        .map(|s| {
            let mut t = s.clone();
            for (k, v) in mapping.iter() {
                t = t.replace(k, v);
            }
            t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::ProgramSubmission;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

    // Shell-based toolchain so the tests run without a JDK: `sh -n` parses
    // the staged script as the "compiler", `sh` runs it.
    fn sh_toolchain() -> ToolchainConfig {
        ToolchainConfig {
            source_file: "Main.sh".to_string(),
            entry_point: "Main.sh".to_string(),
            compile_command: vec!["sh".into(), "-n".into(), "%SOURCE%".into()],
            run_command: vec!["sh".into(), "%ENTRY%".into()],
        }
    }

    async fn create_test_db() -> (Arc<SqlitePool>, std::path::PathBuf) {
        let test_id = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_path = std::env::temp_dir().join(format!(
            "aula_executor_test_{}_{}.db",
            std::process::id(),
            test_id
        ));
        let _ = std::fs::remove_file(&db_path);
        let pool = db::init_db(&db_path).await.unwrap();
        (Arc::new(pool), db_path)
    }

    fn submission(title: &str, source_code: &str) -> ProgramSubmission {
        ProgramSubmission {
            title: title.to_string(),
            description: None,
            source_code: source_code.to_string(),
            difficulty: None,
            topic: None,
            author_id: 1,
        }
    }

    #[tokio::test]
    async fn test_execute_program_success() {
        let (pool, db_path) = create_test_db().await;
        let program = db::create_program(&submission("hello", "echo \"Hello, World\""), pool.clone())
            .await
            .unwrap();

        let response = execute_program(
            program.id,
            pool.clone(),
            &sh_toolchain(),
            &ExecutionConfig::default(),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.compilation_output, "");
        assert_eq!(response.execution_output.as_deref(), Some("Hello, World\n"));
        db::remove_db(&db_path);
    }

    #[tokio::test]
    async fn test_execute_program_compile_failure() {
        let (pool, db_path) = create_test_db().await;
        // A stray `fi` is a guaranteed shell syntax error
        let program = db::create_program(&submission("broken", "fi"), pool.clone())
            .await
            .unwrap();

        let response = execute_program(
            program.id,
            pool.clone(),
            &sh_toolchain(),
            &ExecutionConfig::default(),
        )
        .await
        .unwrap();

        assert!(!response.success);
        assert!(!response.compilation_output.is_empty());
        assert!(response.execution_output.is_none());
        db::remove_db(&db_path);
    }

    #[tokio::test]
    async fn test_execute_program_not_found() {
        let (pool, db_path) = create_test_db().await;

        let result = execute_program(
            424242,
            pool.clone(),
            &sh_toolchain(),
            &ExecutionConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(ExecutionError::ProgramNotFound(424242))));
        db::remove_db(&db_path);
    }

    #[tokio::test]
    async fn test_execute_program_timeout() {
        let (pool, db_path) = create_test_db().await;
        let program = db::create_program(
            &submission("spin", "while true; do :; done"),
            pool.clone(),
        )
        .await
        .unwrap();

        let start = Instant::now();
        let result = execute_program(
            program.id,
            pool.clone(),
            &sh_toolchain(),
            &ExecutionConfig {
                run_timeout_seconds: 1,
            },
        )
        .await;

        assert!(matches!(result, Err(ExecutionError::Timeout { seconds: 1 })));
        assert!(start.elapsed() < Duration::from_secs(3));
        db::remove_db(&db_path);
    }

    #[tokio::test]
    async fn test_execute_program_toolchain_unavailable() {
        let (pool, db_path) = create_test_db().await;
        let program = db::create_program(&submission("orphan", "echo hi"), pool.clone())
            .await
            .unwrap();

        let toolchain = ToolchainConfig {
            compile_command: vec!["aula-no-such-compiler".into(), "%SOURCE%".into()],
            ..sh_toolchain()
        };
        let result = execute_program(
            program.id,
            pool.clone(),
            &toolchain,
            &ExecutionConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(ExecutionError::ToolchainUnavailable(_))));
        db::remove_db(&db_path);
    }

    #[test]
    fn test_apply_template() {
        let mut mapping = HashMap::new();
        mapping.insert("%WORKDIR%", "/tmp/ws");
        mapping.insert("%ENTRY%", "Main");
        let command = apply_template(
            &["java".to_string(), "-cp".to_string(), "%WORKDIR%".to_string(), "%ENTRY%".to_string()],
            &mapping,
        );
        assert_eq!(command, vec!["java", "-cp", "/tmp/ws", "Main"]);
    }
}
