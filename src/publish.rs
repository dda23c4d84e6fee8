//! Snapshot publication and the console table report.
//!
//! The document is written to a temp file in the target directory and
//! renamed over `data.json`, so readers see either the old snapshot or the
//! new one in full, never a partial write.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::collector::CollectedModel;
use crate::metrics::MetricId;
use crate::snapshot::DatasetSnapshot;

pub fn publish_snapshot(snapshot: &DatasetSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .with_context(|| format!("output path has no file name: {}", path.display()))?;
    // Temp file lives in the target directory so the rename never crosses
    // a filesystem boundary.
    let tmp = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// One row per model with its six raw scores and composite index, followed
/// by best/worst/mean statistics.
pub fn render_table(models: &[CollectedModel], snapshot: &DatasetSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<24}", "Model"));
    for metric in MetricId::ALL {
        out.push_str(&format!("{:>10}", metric.as_str()));
    }
    out.push_str(&format!("{:>10}\n", "ESHMIA"));

    for model in models {
        out.push_str(&format!("{:<24}", model.scores.name));
        for (_, raw) in model.scores.scores.iter() {
            out.push_str(&format!("{:>10.1}", raw));
        }
        let composite = snapshot
            .models
            .iter()
            .find(|m| m.name == model.scores.name)
            .map(|m| m.composite);
        match composite {
            Some(value) => out.push_str(&format!("{:>10.4}\n", value)),
            None => out.push_str(&format!("{:>10}\n", "N/A")),
        }
    }

    if let (Some(best), Some(worst)) = (snapshot.models.first(), snapshot.models.last()) {
        out.push_str("\n----- Estatísticas -----\n");
        out.push_str(&format!("Melhor Modelo: {} ({:.4})\n", best.name, best.composite));
        out.push_str(&format!("Pior Modelo: {} ({:.4})\n", worst.name, worst.composite));
        out.push_str(&format!("Média Geral ESHMIA: {:.4}\n", snapshot.overall_mean));
    }
    out
}
