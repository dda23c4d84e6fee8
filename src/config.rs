//! Runtime configuration, one env var per knob with a default.

use crate::metrics::{MetricId, MetricVector};

#[derive(Clone)]
pub struct Config {
    /// Preferred score source: "http", "file", or "sample".
    pub source: String,
    pub source_url: String,
    pub input_path: String,
    pub sqlite_path: String,
    /// Published document path; writes go through a same-directory temp file.
    pub output_path: String,
    pub refresh_secs: u64,
    pub fetch_limit: usize,
    /// Human baseline per metric, the normalization denominator.
    pub baselines: MetricVector,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            source: std::env::var("SOURCE").unwrap_or_else(|_| "http".to_string()),
            source_url: std::env::var("SOURCE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api/benchmarks/latest".to_string()),
            input_path: std::env::var("INPUT_PATH").unwrap_or_else(|_| "./dados.json".to_string()),
            sqlite_path: std::env::var("SQLITE_PATH")
                .unwrap_or_else(|_| "./eshmia.sqlite".to_string()),
            output_path: std::env::var("OUTPUT_PATH")
                .unwrap_or_else(|_| "frontend/data.json".to_string()),
            refresh_secs: env_u64("REFRESH_SECS", 3600),
            fetch_limit: env_u64("FETCH_LIMIT", 100) as usize,
            baselines: MetricVector::from_fn(|m| env_f64(&baseline_env_key(m), 100.0)),
        }
    }
}

/// BASELINE_IFEVAL, BASELINE_BBH, ... BASELINE_MMLU_PRO
fn baseline_env_key(metric: MetricId) -> String {
    format!(
        "BASELINE_{}",
        metric.as_str().replace('-', "_").to_uppercase()
    )
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
