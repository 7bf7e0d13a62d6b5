//! Logging infrastructure - structured tracing plus the host log channel
//!
//! Design: `tracing` for the bridge's own diagnostics, configured once from
//! the environment; a separate free-form sink for messages that belong in
//! the host server's log. Contract violations in the marshaler are reported
//! here, nothing in this module ever aborts the host.

use std::path::Path;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

mod macros;
pub use macros::*;

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Enable file logging
    pub file_output: bool,
    /// Log file path (if file_output enabled)
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_output: false,
            log_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // CELLBRIDGE_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("CELLBRIDGE_LOG_LEVEL") {
            config.level = match level_str.to_lowercase().as_str() {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => Level::INFO,
            };
        }

        // CELLBRIDGE_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("CELLBRIDGE_LOG_FILE") {
            config.file_output = true;
            config.log_path = Some(path);
        }

        // CELLBRIDGE_LOG_JSON: enable JSON format
        config.json_format = std::env::var("CELLBRIDGE_LOG_JSON").is_ok();

        config
    }
}

/// Initialize logging from the environment (idempotent)
pub fn init() {
    init_with(LogConfig::from_env());
}

/// Initialize logging with an explicit configuration (idempotent).
///
/// If the host already installed a global subscriber, that one stays in
/// place and this call is a no-op.
pub fn init_with(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(config.level).into())
            .with_env_var("CELLBRIDGE_LOG")
            .from_env_lossy();

        let registry = tracing_subscriber::registry().with(filter);

        match config.log_path.as_deref().filter(|_| config.file_output) {
            Some(path) => {
                let target = Path::new(path);
                let dir = target
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let file = target
                    .file_name()
                    .map(|name| name.to_os_string())
                    .unwrap_or_else(|| "cellbridge.log".into());
                let appender = tracing_appender::rolling::never(dir, file);

                if config.json_format {
                    registry
                        .with(fmt::layer().json().with_writer(appender).with_ansi(false))
                        .try_init()
                        .ok();
                } else {
                    registry
                        .with(fmt::layer().with_writer(appender).with_ansi(false))
                        .try_init()
                        .ok();
                }
            }
            None => {
                if config.json_format {
                    registry.with(fmt::layer().json()).try_init().ok();
                } else {
                    registry.with(fmt::layer()).try_init().ok();
                }
            }
        }
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

/// Destination for free-form messages bound for the host server's log
pub type LogSink = fn(&str);

static LOG_SINK: RwLock<Option<LogSink>> = RwLock::new(None);

/// Install the host server's log sink.
///
/// Until one is installed, [`server_log`] messages go through `tracing`
/// instead of being lost.
pub fn set_log_sink(sink: LogSink) {
    *LOG_SINK.write() = Some(sink);
}

/// Write one message to the host server's log
pub fn server_log(message: &str) {
    match *LOG_SINK.read() {
        Some(sink) => sink(message),
        None => info!(target: "server", "{}", message),
    }
}
