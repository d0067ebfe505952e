use serde::{Deserialize, Serialize};

pub const DEFAULT_LOGGER_LEVEL: &str = "info";

/// Defines the Logger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Sets the logger [`EnvFilter`](tracing_subscriber::EnvFilter).
    /// Valid values: trace, debug, info, warn, error
    /// Example of a valid filter: "warn,destinations_destination_tiktok_audiences=debug"
    #[serde(default = "default_level")]
    pub level: String,

    /// Determines whether the Logger should print to standard output.
    #[serde(default = "default_stdout_output")]
    pub stdout_output: bool,

    // A file path in the file system; if provided, the Logger will append any output to it.
    #[serde(default)]
    pub file_output_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: default_level(),
            stdout_output: default_stdout_output(),
            file_output_path: None,
        }
    }
}

fn default_level() -> String {
    DEFAULT_LOGGER_LEVEL.to_owned()
}

fn default_stdout_output() -> bool {
    true
}
