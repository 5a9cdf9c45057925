use clap::Parser;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "aula", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file (built-in defaults are used if omitted)
    #[arg(long = "config", short = 'c')]
    pub config_path: Option<String>,

    /// Whether to flush the existing database
    #[arg(long = "flush-data", short = 'f', default_value_t = false)]
    pub flush_data: bool,
}

impl CliArgs {
    /// Load the configuration from the specified file
    pub fn to_config(&self) -> std::io::Result<Config> {
        match &self.config_path {
            Some(path) => {
                let file = std::fs::File::open(path)?;
                let reader = std::io::BufReader::new(file);
                serde_json::from_reader(reader).map_err(|e| e.into())
            }
            None => Ok(Config::default()),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub execution: ExecutionConfig,
    pub toolchain: ToolchainConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Hard wall-clock limit for one program run, in seconds
    pub run_timeout_seconds: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            run_timeout_seconds: 5,
        }
    }
}

/// External compiler/runtime invocation.
///
/// Command templates support `%WORKDIR%` (workspace directory), `%SOURCE%`
/// (staged source file) and `%ENTRY%` (entry point name) placeholders.
/// The defaults target a JDK: sources are staged as `Main.java`, compiled
/// with `javac` and run with `java` restricted to the workspace classpath.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ToolchainConfig {
    pub source_file: String,
    pub entry_point: String,
    pub compile_command: Vec<String>,
    pub run_command: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            source_file: "Main.java".to_string(),
            entry_point: "Main".to_string(),
            compile_command: vec![
                "javac".to_string(),
                "-d".to_string(),
                "%WORKDIR%".to_string(),
                "%SOURCE%".to_string(),
            ],
            run_command: vec![
                "java".to_string(),
                "-cp".to_string(),
                "%WORKDIR%".to_string(),
                "%ENTRY%".to_string(),
            ],
        }
    }
}
