//! # Logger
//!
//! Installs the global `tracing` subscriber for Platter processes.
//!
//! Output goes to the console (compact or JSON lines) and optionally to a
//! rolling file written by a non-blocking worker. `RUST_LOG` is honoured on
//! top of the configured level unless an explicit filter is given with
//! [`LoggerBuilder::env_filter`].
//!
//! ```rust
//! use platter_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("platter-doc")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_MAX_FILES: usize = 14;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

#[derive(Debug)]
struct Settings {
    console: bool,
    console_json: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    file_json: bool,
    env_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: true,
            console_json: false,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            file_json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Type-state builder for the global subscriber.
///
/// A name is required before [`LoggerBuilder::init`] is reachable; file-only
/// options appear once [`LoggerBuilder::path`] was called.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    settings: Settings,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Names the process; also the prefix of rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { settings: self.settings, name: WithName(name.into()), file: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    #[must_use]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes the file output as JSON lines.
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.settings.file_json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Explicit directives such as `platter_ordering=debug,hyper=warn`.
    ///
    /// Replaces `RUST_LOG`. Invalid directives fail in [`LoggerBuilder::init`].
    #[must_use]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.settings.env_filter = (!filter.trim().is_empty()).then_some(filter);
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Emits console output as JSON lines, for log shippers reading stdout.
    #[must_use]
    pub const fn console_json(mut self, enabled: bool) -> Self {
        self.settings.console_json = enabled;
        self
    }

    /// Directory for rolling log files; created on init.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut settings = self.settings;
        settings.path = Some(path.into());
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }

    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it stops the
    /// file worker.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for unusable settings,
    /// [`LoggerError::Appender`] when the log directory cannot be used and
    /// [`LoggerError::Subscriber`] when a subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: WithName(name), .. } = self;
        validate(&settings, &name)?;

        let filter = env_filter(&settings)?;
        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

        if settings.console {
            let console = layer().with_target(true);
            layers.push(if settings.console_json {
                console.json().boxed()
            } else {
                console.compact().with_ansi(true).boxed()
            });
        }

        let guard = match settings.path {
            Some(path) => {
                fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("creating {}", path.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation)
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(&path)
                    .context(format!("log directory {}", path.display()))?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.file_json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "neither console nor file output is enabled".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;
        tracing::debug!(logger = %name, "Logger initialized");

        Ok(Logger { guard })
    }
}

/// Handle to the installed subscriber. Holds the file worker guard.
#[must_use = "dropping the handle stops the file writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: NoName, file: PhantomData }
    }

    /// Parses a configured level name (`trace`, `debug`, `info`, `warn`, `error`, `off`).
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for unknown names.
    pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
        LevelFilter::from_str(level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("unknown log level '{level}': {e}").into(),
            context: None,
        })
    }

    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}

fn validate(settings: &Settings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match &settings.env_filter {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("invalid filter '{directives}': {e}").into(),
                context: None,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn builder_starts_with_console_at_info() {
        let builder = Logger::builder().name("platter-test");
        assert!(builder.settings.console);
        assert!(!builder.settings.console_json);
        assert_eq!(builder.settings.level, LevelFilter::INFO);
        assert!(builder.settings.path.is_none());
    }

    #[test]
    fn blank_filter_is_ignored() {
        let builder = Logger::builder().name("platter-test").env_filter("  ");
        assert!(builder.settings.env_filter.is_none());
    }

    #[test]
    fn file_options_are_recorded() {
        let dir = tempdir().expect("tempdir");
        let builder = Logger::builder()
            .name("platter-test")
            .env_filter("platter_ordering=debug")
            .path(dir.path())
            .max_files(3)
            .rotation(Rotation::HOURLY)
            .json();

        assert_eq!(builder.settings.max_files, 3);
        assert!(builder.settings.file_json);
        assert_eq!(builder.settings.path.as_deref(), Some(dir.path()));
        assert_eq!(builder.settings.env_filter.as_deref(), Some("platter_ordering=debug"));
    }

    #[test]
    fn parse_level_accepts_known_names() {
        assert_eq!(Logger::parse_level("debug").ok(), Some(LevelFilter::DEBUG));
        assert_eq!(Logger::parse_level(" WARN ").ok(), Some(LevelFilter::WARN));
        assert!(matches!(
            Logger::parse_level("loud"),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    #[serial]
    fn zero_max_files_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let err = Logger::builder().name("platter-test").path(dir.path()).max_files(0).init();
        assert!(matches!(err, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn disabled_outputs_are_rejected() {
        let err = Logger::builder().name("platter-test").console(false).init();
        assert!(matches!(err, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn bad_filter_is_rejected() {
        let err = Logger::builder().name("platter-test").env_filter("=[").init();
        assert!(matches!(err, Err(LoggerError::InvalidConfiguration { .. })));
    }
}
