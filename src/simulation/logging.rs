//! Log output for the simulator binary
//!
//! `LoggingConfig` decides where tracing output goes: stderr as pretty text
//! or JSON lines, plus an optional daily-rolling JSON file. The `sim_event!`
//! macro tags lifecycle events with `component = "simulation"`.

use std::io;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Keeps background log writers running until dropped
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard {
    _writers: Vec<WorkerGuard>,
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

/// Rolling log file target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Directory the daily files are created in
    pub directory: PathBuf,
    /// File name prefix, suffixed with the date
    pub prefix: String,
}

impl LogFile {
    /// Daily files named `office-simulator.<date>` in `directory`
    pub fn daily(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), prefix: "office-simulator".to_string() }
    }
}

/// Where and how much the simulator logs
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Maximum level for the crate's own targets
    pub level: Level,
    /// Console format
    pub format: LogFormat,
    /// ANSI colors on the pretty console
    pub ansi: bool,
    /// Log span enter/exit, e.g. around every tick
    pub span_events: bool,
    /// Optional JSON file output
    pub file: Option<LogFile>,
    /// Filter directive overriding `level` and `RUST_LOG`
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            ansi: true,
            span_events: false,
            file: None,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// Configuration selected by the command-line flags
    ///
    /// Without `--verbose` or `--debug` only warnings are shown. Debug also
    /// logs the span of every tick.
    pub fn from_flags(verbose: bool, debug: bool, json: bool, log_dir: Option<&str>) -> Self {
        let level = match (debug, verbose) {
            (true, _) => Level::DEBUG,
            (false, true) => Level::INFO,
            (false, false) => Level::WARN,
        };
        Self {
            level,
            format: if json { LogFormat::Json } else { LogFormat::Pretty },
            ansi: !json,
            span_events: debug,
            file: log_dir.map(LogFile::daily),
            filter: None,
        }
    }

    /// Replace the level-derived filter with a directive such as `office_environment_simulator::simulation=trace`
    pub fn with_filter(mut self, directive: impl Into<String>) -> Self {
        self.filter = Some(directive.into());
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        if let Some(directive) = &self.filter {
            return EnvFilter::try_new(directive);
        }
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Library and binary targets
            EnvFilter::new(format!(
                "{}={level},office_simulator={level}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level = self.level
            ))
        }))
    }

    /// Install the global subscriber
    ///
    /// Fails if a subscriber is already installed. Hold the returned guard
    /// until exit so buffered file output gets flushed.
    pub fn init(self) -> Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>> {
        let env_filter = self.env_filter()?;
        let spans = if self.span_events { FmtSpan::NEW | FmtSpan::CLOSE } else { FmtSpan::NONE };
        let mut writers = Vec::new();

        let file_layer = self.file.as_ref().map(|file| {
            let (writer, guard) = non_blocking(rolling::daily(&file.directory, &file.prefix));
            writers.push(guard);
            fmt::layer().json().with_writer(writer).with_span_events(spans.clone())
        });

        let console_layer = match self.format {
            LogFormat::Json => fmt::layer().json().with_writer(io::stderr).with_span_events(spans).boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_ansi(self.ansi)
                .with_writer(io::stderr)
                .with_span_events(spans)
                .boxed(),
        };

        Registry::default().with(env_filter).with(file_layer).with(console_layer).try_init()?;

        info!(
            level = %self.level,
            format = ?self.format,
            log_file = ?self.file.as_ref().map(|file| &file.directory),
            "Logging initialized"
        );
        Ok(LoggingGuard { _writers: writers })
    }
}

/// Emit a tracing event tagged as a simulation lifecycle event
///
/// Values go through `tracing` field syntax, so wrap non-primitive values in
/// `tracing::field::display` or `debug`.
#[macro_export]
macro_rules! sim_event {
    ($level:ident, $name:expr $(, $field:ident = $value:expr)* $(,)?) => {
        tracing::$level!(
            component = "simulation",
            event = $name,
            $($field = $value,)*
        )
    };
}
