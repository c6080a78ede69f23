//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the process-wide `tracing` subscriber exactly once
//! - Write one JSON object per line to the service log file
//! - Keep reserved record fields out of reach of caller-supplied fields
//!
//! # Record Shape
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.123456Z","level":"WARN","message":"retry failure",
//!  "endpoint":"retry","attempt":1,"error_reason":"simulated transient failure"}
//! ```
//!
//! # Design Decisions
//! - Each record is written with a single `write_all` under a mutex, so
//!   concurrent requests never interleave partial lines
//! - Console output goes through the regular `fmt` layer, filtered by
//!   `RUST_LOG` or the configured console level
//! - A second `init` is refused rather than attaching a second sink

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;

/// Field names callers may not set. `message` is only taken from the event
/// itself; later `message` fields are dropped.
const RESERVED_FIELDS: &[&str] = &[
    "timestamp",
    "level",
    "message",
    "target",
    "module_path",
    "file",
    "line",
    "name",
    "thread",
    "thread_id",
    "thread_name",
    "span",
    "spans",
];

fn is_reserved(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name) || name.starts_with("log.")
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("logging is already initialized")]
    AlreadyInitialized,
    #[error("cannot open log file {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("invalid log level '{0}'")]
    Level(String),
    #[error("cannot install subscriber: {0}")]
    Subscriber(String),
}

/// Shared line writer behind the JSON layer.
struct LineSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LineSink {
    fn write_line(&self, line: &[u8]) {
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Write errors are dropped; the caller never sees them.
        let _ = writer.write_all(line);
        let _ = writer.flush();
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

/// `tracing` layer emitting JSON lines.
pub struct JsonLineLayer {
    sink: Arc<LineSink>,
}

impl JsonLineLayer {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(LineSink {
                writer: Mutex::new(Box::new(writer)),
            }),
        }
    }
}

impl<S: Subscriber> Layer<S> for JsonLineLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let record = Record {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            level: event.metadata().level().to_string(),
            message: fields.message.unwrap_or_default(),
            fields: fields.values,
        };

        if let Ok(mut line) = serde_json::to_vec(&record) {
            line.push(b'\n');
            self.sink.write_line(&line);
        }
    }
}

#[derive(Serialize)]
struct Record {
    timestamp: String,
    level: String,
    message: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: Map<String, Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            if self.message.is_none() {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            return;
        }
        if is_reserved(name) || self.values.contains_key(name) {
            return;
        }
        self.values.insert(name.to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }
}

/// Flushes the log sink when dropped. Hold it for the life of the process.
pub struct LogGuard {
    sink: Arc<LineSink>,
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard").finish_non_exhaustive()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        self.sink.flush();
    }
}

/// Install the process-wide subscriber: JSON lines to `config.log_file`,
/// human-readable output on the console.
pub fn init(config: &ObservabilityConfig) -> Result<LogGuard, LoggingError> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(LoggingError::AlreadyInitialized);
    }

    let result = install(config);
    if result.is_err() {
        INITIALIZED.store(false, Ordering::SeqCst);
    }
    result
}

fn install(config: &ObservabilityConfig) -> Result<LogGuard, LoggingError> {
    let file_level =
        Level::from_str(&config.file_level).map_err(|_| LoggingError::Level(config.file_level.clone()))?;
    let file = open_append(Path::new(&config.log_file)).map_err(|source| LoggingError::Open {
        path: config.log_file.clone(),
        source,
    })?;

    let json = JsonLineLayer::new(file);
    let guard = LogGuard {
        sink: json.sink.clone(),
    };

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.console_level));

    tracing_subscriber::registry()
        .with(json.with_filter(LevelFilter::from_level(file_level)))
        .with(fmt::layer().with_filter(console_filter))
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;

    Ok(guard)
}

fn open_append(path: &Path) -> io::Result<fs::File> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
