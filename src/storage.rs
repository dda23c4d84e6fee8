//! SQLite history of collection and computation runs.
//!
//! Each run appends one row to `runs` plus its raw results and computed
//! indices, so successive snapshots stay auditable after `data.json` has
//! been replaced.

use anyhow::Result;
use rusqlite::{params, Connection};

use crate::collector::CollectedModel;
use crate::metrics::MetricVector;
use crate::snapshot::DatasetSnapshot;

pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    pub fn new(path: &str) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn init(&mut self, baselines: &MetricVector) -> Result<()> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS baselines (
                metric TEXT PRIMARY KEY,
                value REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts TEXT NOT NULL,
                n_models INTEGER NOT NULL,
                eshmia_medio REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS raw_results (
                run_id INTEGER NOT NULL,
                model TEXT NOT NULL,
                source TEXT,
                origin_url TEXT,
                metric TEXT NOT NULL,
                raw_value REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS indices (
                run_id INTEGER NOT NULL,
                model TEXT NOT NULL,
                rank INTEGER NOT NULL,
                eshmia REAL NOT NULL
            );
            COMMIT;",
        )?;
        // The configured baselines are recorded alongside the history they
        // normalized, so stored raw values stay interpretable.
        let tx = self.conn.transaction()?;
        for (metric, value) in baselines.iter() {
            tx.execute(
                "INSERT OR REPLACE INTO baselines (metric, value) VALUES (?1, ?2)",
                params![metric.as_str(), value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Append one completed run: raw scores per model/metric plus the
    /// ranked composite indices. All-or-nothing.
    pub fn record_run(
        &mut self,
        models: &[CollectedModel],
        snapshot: &DatasetSnapshot,
    ) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO runs (ts, n_models, eshmia_medio) VALUES (?1, ?2, ?3)",
            params![
                snapshot.timestamp,
                models.len() as i64,
                snapshot.overall_mean
            ],
        )?;
        let run_id = tx.last_insert_rowid();
        for model in models {
            for (metric, raw_value) in model.scores.scores.iter() {
                tx.execute(
                    "INSERT INTO raw_results (run_id, model, source, origin_url, metric, raw_value)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        run_id,
                        model.scores.name,
                        model.source,
                        model.origin_url,
                        metric.as_str(),
                        raw_value
                    ],
                )?;
            }
        }
        for (position, record) in snapshot.models.iter().enumerate() {
            tx.execute(
                "INSERT INTO indices (run_id, model, rank, eshmia) VALUES (?1, ?2, ?3, ?4)",
                params![run_id, record.name, (position + 1) as i64, record.composite],
            )?;
        }
        tx.commit()?;
        Ok(run_id)
    }

    pub fn run_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn latest_overall_mean(&self) -> Result<Option<f64>> {
        let mean = self
            .conn
            .query_row(
                "SELECT eshmia_medio FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(mean)
    }
}
