mod aggregate;
mod analysis;
mod collector;
mod config;
mod logging;
mod metrics;
mod publish;
mod retry;
mod snapshot;
mod storage;

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tokio::time::{sleep, Duration};

use aggregate::RawModelScores;
use config::Config;
use logging::{log, obj, v_num, v_str, Domain, Level};
use storage::HistoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Flags {
    /// Run one cycle and exit instead of looping on the refresh interval.
    once: bool,
    /// Print the per-model score table after each cycle.
    table: bool,
}

fn parse_flags(args: &[String]) -> Result<Flags, String> {
    let mut flags = Flags::default();
    for arg in args {
        match arg.as_str() {
            "--once" => flags.once = true,
            "--table" => flags.table = true,
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let flags = parse_flags(&args).map_err(|e| anyhow::anyhow!(e))?;
    let cfg = Config::from_env();

    // A broken baseline fails startup; no run can normalize against it.
    aggregate::validate_baselines(&cfg.baselines)?;

    let mut store = HistoryStore::new(&cfg.sqlite_path)?;
    store.init(&cfg.baselines)?;

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("source", v_str(&cfg.source)),
            ("output_path", v_str(&cfg.output_path)),
            ("refresh_secs", v_num(cfg.refresh_secs as f64)),
        ]),
    );

    loop {
        match run_once(&cfg, &mut store, flags.table).await {
            Ok(n_models) => {
                log(
                    Level::Info,
                    Domain::System,
                    "cycle_complete",
                    obj(&[("models", v_num(n_models as f64))]),
                );
            }
            Err(err) => {
                // The run aborted before publication; the previously
                // published snapshot stays in place.
                log(
                    Level::Error,
                    Domain::System,
                    "cycle_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
            }
        }
        if flags.once {
            break;
        }
        sleep(Duration::from_secs(cfg.refresh_secs)).await;
    }
    Ok(())
}

/// One full cycle: collect, aggregate, record, publish.
async fn run_once(cfg: &Config, store: &mut HistoryStore, table: bool) -> Result<usize> {
    let models = collector::collect(cfg).await;
    let raw: Vec<RawModelScores> = models.iter().map(|m| m.scores.clone()).collect();

    let timestamp = Utc::now().to_rfc3339();
    let snapshot = aggregate::aggregate(&raw, &cfg.baselines, timestamp)?;
    log(
        Level::Info,
        Domain::Compute,
        "aggregated",
        obj(&[
            ("models", v_num(snapshot.models.len() as f64)),
            ("eshmia_medio", v_num(snapshot.overall_mean)),
        ]),
    );

    let run_id = store.record_run(&models, &snapshot)?;
    log(
        Level::Info,
        Domain::Storage,
        "run_recorded",
        obj(&[("run_id", v_num(run_id as f64))]),
    );

    publish::publish_snapshot(&snapshot, Path::new(&cfg.output_path))?;
    log(
        Level::Info,
        Domain::Publish,
        "published",
        obj(&[
            ("path", v_str(&cfg.output_path)),
            ("timestamp", v_str(&snapshot.timestamp)),
        ]),
    );

    if table {
        println!("{}", publish::render_table(&models, &snapshot));
    }
    Ok(models.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_defaults() {
        let flags = parse_flags(&[]).unwrap();
        assert!(!flags.once);
        assert!(!flags.table);
    }

    #[test]
    fn test_parse_flags_once_and_table() {
        let args = vec!["--once".to_string(), "--table".to_string()];
        let flags = parse_flags(&args).unwrap();
        assert!(flags.once);
        assert!(flags.table);
    }

    #[test]
    fn test_parse_flags_rejects_unknown() {
        let args = vec!["--bogus".to_string()];
        assert!(parse_flags(&args).is_err());
    }
}
