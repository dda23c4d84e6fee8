//! Score collection: sources, name canonicalization, strict filtering.
//!
//! Sources deliver loosely-shaped rows (string-keyed metric maps). This
//! module turns them into typed `RawModelScores`, dropping rows that lack
//! any of the six required metrics and de-duplicating canonical names.
//! When the preferred source is unreachable it falls back to a local file
//! and finally to built-in sample records, so a run always has input.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::aggregate::{AggregateError, RawModelScores};
use crate::config::Config;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::metrics::MetricVector;
use crate::retry::{retry_async, RetryConfig};

/// One model row as delivered by a source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub nome: String,
    #[serde(default)]
    pub fonte: Option<String>,
    #[serde(default)]
    pub url_origem: Option<String>,
    pub metricas: HashMap<String, f64>,
}

/// A validated model ready for aggregation, with provenance for the
/// history store.
#[derive(Debug, Clone)]
pub struct CollectedModel {
    pub scores: RawModelScores,
    pub source: String,
    pub origin_url: String,
}

#[async_trait]
pub trait ScoreSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<SourceRecord>>;
}

pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl ScoreSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_latest(&self, limit: usize) -> Result<Vec<SourceRecord>> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("limit", limit)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("source returned HTTP {}", resp.status()));
        }
        Ok(resp.json().await?)
    }
}

pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ScoreSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_latest(&self, limit: usize) -> Result<Vec<SourceRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut records: Vec<SourceRecord> = serde_json::from_str(&content)?;
        records.truncate(limit);
        Ok(records)
    }
}

/// Built-in records, the fallback of last resort.
pub struct SampleSource;

#[async_trait]
impl ScoreSource for SampleSource {
    fn name(&self) -> &'static str {
        "sample"
    }

    async fn fetch_latest(&self, limit: usize) -> Result<Vec<SourceRecord>> {
        let mut records = sample_records();
        records.truncate(limit);
        Ok(records)
    }
}

fn sample_records() -> Vec<SourceRecord> {
    let rows: [(&str, &str, [f64; 6]); 4] = [
        ("Atlas-5", "SimTheory", [88.2, 79.4, 71.0, 54.3, 66.1, 70.8]),
        ("Prometheus-Pro", "EdenAI", [84.9, 81.2, 68.7, 58.0, 62.4, 73.5]),
        ("Orion-X", "Artificial Analysis", [79.5, 74.8, 60.2, 49.7, 58.9, 65.3]),
        ("Nexus-9", "HuggingFace", [72.1, 68.0, 52.6, 44.1, 55.2, 60.7]),
    ];
    rows.iter()
        .map(|(name, source, scores)| SourceRecord {
            nome: name.to_string(),
            fonte: Some(source.to_string()),
            url_origem: Some(format!(
                "https://example.com/models/{}",
                canonical_name(name)
            )),
            metricas: json_metric_map(scores),
        })
        .collect()
}

fn json_metric_map(scores: &[f64; 6]) -> HashMap<String, f64> {
    crate::metrics::MetricId::ALL
        .into_iter()
        .zip(scores.iter())
        .map(|(m, v)| (m.as_str().to_string(), *v))
        .collect()
}

pub fn build_source(cfg: &Config) -> Box<dyn ScoreSource> {
    match cfg.source.as_str() {
        "file" => Box::new(FileSource::new(cfg.input_path.clone())),
        "sample" => Box::new(SampleSource),
        _ => Box::new(HttpSource::new(cfg.source_url.clone())),
    }
}

/// Canonical display form: lowercase, spaces and slashes become dashes.
pub fn canonical_name(name: &str) -> String {
    name.to_lowercase().replace([' ', '/'], "-")
}

/// Apply the strict six-metric filter and de-duplicate canonical names,
/// keeping input order. Rejected rows are logged and skipped, never
/// silently defaulted.
pub fn canonicalize(records: Vec<SourceRecord>, origin: &str) -> Vec<CollectedModel> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let name = canonical_name(&record.nome);
        if !seen.insert(name.clone()) {
            log(
                Level::Warn,
                Domain::Collect,
                "duplicate_model",
                obj(&[("model", v_str(&name))]),
            );
            continue;
        }
        let vector = MetricVector::try_from_fn(|m| {
            record
                .metricas
                .get(m.as_str())
                .copied()
                .ok_or(AggregateError::IncompleteData {
                    model: name.clone(),
                    metric: m.as_str(),
                })
        });
        match vector {
            Ok(scores) => out.push(CollectedModel {
                scores: RawModelScores { name, scores },
                source: record.fonte.unwrap_or_else(|| origin.to_string()),
                origin_url: record.url_origem.unwrap_or_default(),
            }),
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Collect,
                    "record_rejected",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
            }
        }
    }
    out
}

/// Fetch from the preferred source, falling back to the local file and then
/// to sample data. Returns at least the sample set.
pub async fn collect(cfg: &Config) -> Vec<CollectedModel> {
    let retry = RetryConfig::default();
    let primary = build_source(cfg);

    let mut chain: Vec<Box<dyn ScoreSource>> = vec![primary];
    if cfg.source != "file" {
        chain.push(Box::new(FileSource::new(cfg.input_path.clone())));
    }
    if cfg.source != "sample" {
        chain.push(Box::new(SampleSource));
    }

    for source in &chain {
        let fetched = retry_async(&retry, source.name(), || {
            source.fetch_latest(cfg.fetch_limit)
        })
        .await;
        match fetched {
            Ok(records) => {
                let total = records.len();
                let models = canonicalize(records, source.name());
                if models.is_empty() {
                    log(
                        Level::Warn,
                        Domain::Collect,
                        "source_empty",
                        obj(&[
                            ("source", v_str(source.name())),
                            ("rows_fetched", v_num(total as f64)),
                        ]),
                    );
                    continue;
                }
                log(
                    Level::Info,
                    Domain::Collect,
                    "collected",
                    obj(&[
                        ("source", v_str(source.name())),
                        ("rows_fetched", v_num(total as f64)),
                        ("models", v_num(models.len() as f64)),
                    ]),
                );
                return models;
            }
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Collect,
                    "source_unavailable",
                    obj(&[
                        ("source", v_str(source.name())),
                        ("error", v_str(&err.to_string())),
                    ]),
                );
            }
        }
    }

    // Unreachable in practice: SampleSource never fails and never yields
    // an empty, all-rejected batch.
    let models = canonicalize(sample_records(), "sample");
    log(
        Level::Warn,
        Domain::Collect,
        "collected",
        obj(&[
            ("source", v_str("sample")),
            ("models", v_num(models.len() as f64)),
        ]),
    );
    models
}
