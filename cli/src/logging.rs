//! Tracing subscriber setup driven by the `[logging]` config section.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use waveportal_core::api::CliError;
use waveportal_core::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "waveportal.log";

/// Keeps the file writer flushing. Drop it at the end of `main`.
#[derive(Default)]
pub struct LogHandle {
    _file: Option<WorkerGuard>,
}

/// Directory the rolling log file goes to.
pub fn log_dir(logging: &LoggingConfig) -> PathBuf {
    logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("waveportal"))
}

/// `RUST_LOG` wins over the configured level when set.
fn build_filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter, CliError> {
    let directives = rust_log
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(level);
    EnvFilter::try_new(directives)
        .map_err(|e| CliError::Config(format!("invalid log filter {directives:?}: {e}")))
}

pub fn init(logging: &LoggingConfig) -> Result<LogHandle, CliError> {
    if !logging.enabled {
        return Ok(LogHandle::default());
    }
    if !logging.console && !logging.file {
        return Err(CliError::Config(
            "logging enabled with neither console nor file output".to_string(),
        ));
    }

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(&logging.level, rust_log.as_deref())?;

    let (file_layer, guard) = if logging.file {
        let dir = log_dir(logging);
        std::fs::create_dir_all(&dir)?;
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Command(format!("tracing already initialized: {e}")))?;

    Ok(LogHandle { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_is_used() {
        let cfg = LoggingConfig {
            directory: Some(" /var/log/waveportal ".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(log_dir(&cfg), PathBuf::from("/var/log/waveportal"));
    }

    #[test]
    fn blank_directory_falls_back_to_temp() {
        let cfg = LoggingConfig {
            directory: Some("  ".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(log_dir(&cfg), std::env::temp_dir().join("waveportal"));
    }

    #[test]
    fn rust_log_overrides_level() {
        let filter = build_filter("info", Some("waveportal_core=trace")).unwrap();
        assert!(filter.to_string().contains("waveportal_core=trace"));
    }

    #[test]
    fn empty_rust_log_keeps_level() {
        let filter = build_filter("warn", Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn bad_level_is_a_config_error() {
        let err = build_filter("waveportal=loud", None).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn no_outputs_is_rejected() {
        let cfg = LoggingConfig {
            console: false,
            file: false,
            ..LoggingConfig::default()
        };
        assert!(matches!(init(&cfg), Err(CliError::Config(_))));
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let cfg = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(init(&cfg).is_ok());
    }
}
