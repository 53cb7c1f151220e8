//! # Logger
//!
//! Host-side logging: console and rolling-file output behind one global `tracing`
//! subscriber, with non-blocking file I/O and `RUST_LOG`-style filtering.
//!
//! The host installs it after the endpoint configuration is resolved, at the resolved
//! [`Severity`], unless the endpoint configures logging itself.
//!
//! ## Example
//!
//! ```rust
//! use courier_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder("orders-host")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use courier_domain::{LoggingSettings, Severity};
use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Maps the resolved endpoint severity onto a subscriber filter.
#[must_use]
pub const fn level_filter(severity: Severity) -> LevelFilter {
    match severity {
        Severity::Trace => LevelFilter::TRACE,
        Severity::Debug => LevelFilter::DEBUG,
        Severity::Info => LevelFilter::INFO,
        Severity::Warn => LevelFilter::WARN,
        Severity::Error => LevelFilter::ERROR,
        Severity::Off => LevelFilter::OFF,
    }
}

#[derive(Debug)]
struct FileOutput {
    path: PathBuf,
    rotation: Rotation,
    max_files: usize,
}

#[derive(Debug)]
struct LoggerConfig {
    name: String,
    level: LevelFilter,
    console: bool,
    file: Option<FileOutput>,
    json: bool,
    env_filter: Option<String>,
}

/// Builder state: console only.
#[derive(Debug)]
pub struct Console;
/// Builder state: writing rolling files.
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for Console {}
impl Sealed for WithFile {}

/// Configures and installs the global tracing subscriber.
///
/// File-only knobs (`rotation`, `max_files`, `json`) become available once `path` is set.
#[derive(Debug)]
pub struct LoggerBuilder<F: Sealed = Console> {
    config: LoggerConfig,
    output: PhantomData<F>,
}

impl LoggerBuilder<Console> {
    /// Sets the directory rolling log files are written to.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithFile> {
        let mut config = self.config;
        config.file = Some(FileOutput {
            path: path.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        });
        LoggerBuilder { config, output: PhantomData }
    }

    /// Applies operator settings at the given severity.
    ///
    /// Returns a file-writing builder either way so both outcomes share one type.
    pub fn settings(self, settings: &LoggingSettings, severity: Severity) -> LoggerBuilder<WithFile> {
        let mut builder = self.console(settings.console).level(level_filter(severity));
        if let Some(filter) = &settings.env_filter {
            builder = builder.env_filter(filter.clone());
        }

        let mut config = builder.config;
        config.file = settings.path.as_ref().map(|path| FileOutput {
            path: path.clone(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        });
        config.json = settings.json && config.file.is_some();
        LoggerBuilder { config, output: PhantomData }
    }
}

impl LoggerBuilder<WithFile> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = &mut self.config.file {
            file.rotation = rotation;
        }
        self
    }

    /// Maximum number of rolled files kept on disk.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = &mut self.config.file {
            file.max_files = max;
        }
        self
    }

    /// Writes JSON lines to the log files. The console keeps the compact format.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<F> {
    /// Minimum level emitted unless `RUST_LOG` or [`Self::env_filter`] says otherwise.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Programmatic filter directives, e.g. `courier_kernel=trace,info`.
    ///
    /// An invalid filter makes [`Self::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's [`WorkerGuard`]; keep it alive until
    /// shutdown so buffered lines are flushed.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for a blank name, zero `max_files`, an
    ///   invalid filter, or when neither console nor file output is enabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] if the log directory is unusable.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let config = self.config;
        validate(&config)?;
        let filter = env_filter(&config)?;

        let mut layers = Vec::new();
        if config.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match &config.file {
            Some(file) => {
                fs::create_dir_all(&file.path)
                    .context(format!("Failed to create {}", file.path.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(file.rotation.clone())
                    .filename_prefix(&config.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(file.max_files)
                    .build(&file.path)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if config.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled: turn on the console or set a log path".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(name = %config.name, level = %config.level, "Logger installed");

        Ok(Logger { guard })
    }
}

/// Handle to the installed logger.
///
/// Holds the background file writer; dropping it stops file output after a final flush.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder. `name` prefixes rolled files, e.g. `orders-host.2026-10-16.log`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig {
                name: name.into(),
                level: LevelFilter::INFO,
                console: true,
                file: None,
                json: false,
                env_filter: None,
            },
            output: PhantomData,
        }
    }

    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logger shutting down, flushing buffers...");
        }
    }
}

fn validate(config: &LoggerConfig) -> Result<(), LoggerError> {
    if config.name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if config.file.as_ref().is_some_and(|file| file.max_files == 0) {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match &config.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(filter) => builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("invalid env filter '{filter}': {e}").into(),
            context: None,
        }),
    }
}
