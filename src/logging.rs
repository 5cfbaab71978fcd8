//! Structured logging setup.
//!
//! Output goes to stderr so it never mixes with command output.
//!
//! Every module logs through `tracing` macros with structured fields. This
//! module installs the global subscriber: an [`EnvFilter`], an optional
//! sampling layer, and a JSON or pretty `fmt` layer, written synchronously
//! or through a `tracing-appender` worker.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `COMPONO_LOG_LEVEL` | `info` | base level when `RUST_LOG` is unset |
//! | `COMPONO_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `COMPONO_LOG_SAMPLING_MODE` | `all` | `all`, `error-only` or `sampled` |
//! | `COMPONO_LOG_SAMPLING_RATE` | `1.0` | fraction of non-error events kept when sampled |
//! | `COMPONO_LOG_TARGET_FILTER` | unset | extra directives, comma separated |
//! | `COMPONO_LOG_ASYNC` | `false` | write through a background worker |
//! | `COMPONO_LOG_INCLUDE_LOCATION` | `false` | add file and line |

use anyhow::{Context, Result};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::subscriber::Interest;
use tracing::{Level, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// JSON for production, pretty-print for development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Which events reach the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    All,
    /// WARN and ERROR only.
    ErrorOnly,
    /// Every WARN and ERROR, a fraction of the rest.
    Sampled,
}

impl SamplingMode {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error-only" | "error_only" => SamplingMode::ErrorOnly,
            "sampled" => SamplingMode::Sampled,
            _ => SamplingMode::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    pub sampling_mode: SamplingMode,
    /// 0.0 to 1.0, used by [`SamplingMode::Sampled`]
    pub sampling_rate: f64,
    /// Extra `EnvFilter` directives, comma separated.
    pub target_filter: Option<String>,
    pub async_logging: bool,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::default_prod()
    }
}

impl LogConfig {
    /// Read the `COMPONO_LOG_*` variables, falling back to production defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default_prod();
        Self {
            log_level: lookup("COMPONO_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("COMPONO_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            sampling_mode: lookup("COMPONO_LOG_SAMPLING_MODE")
                .map(|s| SamplingMode::parse(&s))
                .unwrap_or(defaults.sampling_mode),
            sampling_rate: lookup("COMPONO_LOG_SAMPLING_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sampling_rate),
            target_filter: lookup("COMPONO_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            async_logging: lookup("COMPONO_LOG_ASYNC")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            include_location: lookup("COMPONO_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            sampling_mode: SamplingMode::All,
            sampling_rate: 1.0,
            target_filter: None,
            async_logging: false,
            include_location: true,
        }
    }

    pub fn default_prod() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            sampling_mode: SamplingMode::All,
            sampling_rate: 1.0,
            target_filter: None,
            async_logging: false,
            include_location: false,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// `RUST_LOG` when set, else the configured level, plus the target filter.
    ///
    /// Directives that fail to parse are reported and skipped.
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                match directive.parse() {
                    Ok(directive) => filter = filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: invalid log filter directive: {directive}"),
                }
            }
        }
        filter
    }
}

/// Drops events according to a [`SamplingMode`].
pub struct SamplingLayer {
    mode: SamplingMode,
    interval: u64,
    counter: AtomicU64,
}

impl SamplingLayer {
    pub fn new(mode: SamplingMode, sampling_rate: f64) -> Self {
        let rate = sampling_rate.clamp(0.0, 1.0);
        let interval = if rate > 0.0 { (1.0 / rate).round() as u64 } else { 0 };
        Self {
            mode,
            interval,
            counter: AtomicU64::new(0),
        }
    }

    fn should_sample(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_span() || self.keep_event(*metadata.level())
    }

    fn keep_event(&self, level: Level) -> bool {
        let severe = matches!(level, Level::WARN | Level::ERROR);
        match self.mode {
            SamplingMode::All => true,
            SamplingMode::ErrorOnly => severe,
            SamplingMode::Sampled => {
                if severe {
                    return true;
                }
                let count = self.counter.fetch_add(1, Ordering::Relaxed);
                self.interval > 0 && count % self.interval == 0
            }
        }
    }
}

impl<S> Layer<S> for SamplingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn register_callsite(&self, metadata: &'static Metadata<'static>) -> Interest {
        match self.mode {
            // decided per event, never cached per callsite
            SamplingMode::Sampled => Interest::sometimes(),
            SamplingMode::All | SamplingMode::ErrorOnly => {
                if self.should_sample(metadata) {
                    Interest::always()
                } else {
                    Interest::never()
                }
            }
        }
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: LayerContext<'_, S>) -> bool {
        self.should_sample(metadata)
    }
}

/// Install the global subscriber.
///
/// With `async_logging` the returned guard owns the writer thread; keep it
/// alive for the lifetime of the process so buffered lines get flushed.
///
/// ```no_run
/// use compono::logging::{init_logging_with_config, LogConfig};
///
/// let _guard = init_logging_with_config(&LogConfig::from_env())
///     .expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry()
        .with(config.env_filter())
        .with(SamplingLayer::new(config.sampling_mode, config.sampling_rate));

    let (writer, guard) = if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    registry
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(guard)
}

/// [`init_logging_with_config`] with the environment's settings.
pub fn init_logging() -> Result<Option<WorkerGuard>> {
    init_logging_with_config(&LogConfig::from_env())
}
