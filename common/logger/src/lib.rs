use std::ffi::OsStr;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::subscriber::set_global_default;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, reload, EnvFilter, Registry};

pub mod config;

pub use config::LoggerConfig;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("LoggerConfigurationError: [{message}]")]
    LoggerConfigurationError { message: String },
}

impl From<log::SetLoggerError> for LoggerError {
    fn from(error: log::SetLoggerError) -> Self {
        LoggerError::LoggerConfigurationError { message: format!("{}", error) }
    }
}

/// Keeps the non-blocking writers alive and allows changing the log filter at runtime.
/// Dropping it flushes and stops the writers.
pub struct LogWorkerGuard {
    _file_guard: Option<WorkerGuard>,
    _stdout_guard: Option<WorkerGuard>,
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl LogWorkerGuard {
    pub fn reload(&self, env_filter_str: &str) -> Result<(), LoggerError> {
        let env_filter = parse_env_filter(env_filter_str)?;
        self.reload_handle.reload(env_filter).map_err(|err| LoggerError::LoggerConfigurationError {
            message: format!("Cannot reload the logger configuration. err: {:?}", err),
        })
    }
}

/// Configures the global `tracing` subscriber and bridges the `log` records into it.
pub fn setup_logger(logger_config: &LoggerConfig) -> Result<LogWorkerGuard, LoggerError> {
    let (env_filter, reload_handle) = reload::Layer::new(parse_env_filter(&logger_config.level)?);

    let (file_layer, file_guard) = match logger_config.file_output_path.as_deref() {
        Some(file_output_path) => {
            let (dir, file_name) = split_file_path(file_output_path)?;
            let (layer, guard) =
                non_blocking_layer(tracing_appender::rolling::never(dir, file_name));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (stdout_layer, stdout_guard) = if logger_config.stdout_output {
        let (layer, guard) = non_blocking_layer(std::io::stdout());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_log::LogTracer::init()?;
    let subscriber =
        tracing_subscriber::registry().with(env_filter).with(file_layer).with(stdout_layer);
    set_global_default(subscriber).map_err(|err| LoggerError::LoggerConfigurationError {
        message: format!("Cannot start the logger. err: {:?}", err),
    })?;

    Ok(LogWorkerGuard { _file_guard: file_guard, _stdout_guard: stdout_guard, reload_handle })
}

/// A plain text layer that writes to `writer` from a dedicated thread.
fn non_blocking_layer<S, W>(
    writer: W,
) -> (Layer<S, DefaultFields, Format, NonBlocking>, WorkerGuard)
where
    W: std::io::Write + Send + 'static,
{
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    (Layer::new().with_ansi(false).with_writer(non_blocking), guard)
}

fn parse_env_filter(env_filter_str: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::from_str(env_filter_str).map_err(|err| LoggerError::LoggerConfigurationError {
        message: format!("Cannot parse the logger level: [{}]. err: {:?}", env_filter_str, err),
    })
}

/// Splits the log file path into its directory and its file name.
/// A bare file name is rejected: the directory must be explicit.
fn split_file_path(file_output_path: &str) -> Result<(&Path, &OsStr), LoggerError> {
    let path = Path::new(file_output_path);
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(file_name)) if !dir.as_os_str().is_empty() => Ok((dir, file_name)),
        _ => Err(LoggerError::LoggerConfigurationError {
            message: format!("Output file path [{}] must contain a directory", file_output_path),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_split_the_file_path() {
        assert_eq!(
            (Path::new("/tmp/hello"), OsStr::new("filename")),
            split_file_path("/tmp/hello/filename").unwrap()
        );
        assert_eq!(
            (Path::new("/"), OsStr::new("destinations.log")),
            split_file_path("/destinations.log").unwrap()
        );
        assert_eq!(
            (Path::new("logs/destinations"), OsStr::new("destinations.log")),
            split_file_path("logs/destinations/destinations.log").unwrap()
        );
    }

    #[test]
    fn split_the_file_path_should_fail_if_directory_is_not_present() {
        assert!(split_file_path("destinations.log").is_err());
        assert!(split_file_path("").is_err());
    }

    #[test]
    fn should_fail_on_invalid_filter() {
        assert!(parse_env_filter("info,destinations=loud").is_err());
    }
}
