//! Structured JSON logging.
//!
//! One JSON object per line on stdout. Levels are filtered via `LOG_LEVEL`
//! and categories via `LOG_DOMAINS` (comma-separated list or "all").

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("debug") => Level::Debug,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// Log categories for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Collect, // Source fetches, fallbacks, record filtering
    Compute, // Aggregation runs
    Storage, // SQLite history writes
    Publish, // Snapshot serialization and rename
    System,  // Startup, shutdown, cycle timing
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Collect => "collect",
            Domain::Compute => "compute",
            Domain::Storage => "storage",
            Domain::Publish => "publish",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Emit a structured log entry.
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert(
        "seq".to_string(),
        json!(LOG_SEQ.fetch_add(1, Ordering::SeqCst)),
    );
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("domain".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    for (k, v) in fields {
        entry.insert(k, v);
    }
    println!("{}", Value::Object(entry));
}

// Field-building helpers for call sites.

pub fn obj(fields: &[(&str, Value)]) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn v_str(value: &str) -> Value {
    Value::String(value.to_string())
}

pub fn v_num(value: f64) -> Value {
    json!(value)
}
