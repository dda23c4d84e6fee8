//! The published dataset snapshot and its JSON wire format.
//!
//! Field names on the wire are fixed by the deployed dashboard and must not
//! change (`eshmia_medio`, `lista_modelos`, `nome_normalizado`, ...). The
//! Rust-side names are ours; serde renames carry the contract.

use serde::{Deserialize, Serialize};

use crate::metrics::{MetricId, MetricVector};

/// One model's normalized scores and derived composite index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(rename = "nome_normalizado")]
    pub name: String,
    #[serde(rename = "valor_eshmia")]
    pub composite: f64,
    #[serde(rename = "valores_normalizados")]
    pub normalized: MetricVector,
}

/// The model holding an extreme value for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricExtreme {
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "valor")]
    pub value: f64,
}

/// Summary statistics for one metric across all models in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetric {
    #[serde(rename = "media")]
    pub mean: f64,
    #[serde(rename = "maximo")]
    pub max: MetricExtreme,
    #[serde(rename = "minimo")]
    pub min: MetricExtreme,
}

/// One `AggregateMetric` per metric, emitted in canonical metric order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSet {
    #[serde(rename = "IFEval")]
    pub ifeval: AggregateMetric,
    #[serde(rename = "BBH")]
    pub bbh: AggregateMetric,
    #[serde(rename = "MATH")]
    pub math: AggregateMetric,
    #[serde(rename = "GPQA")]
    pub gpqa: AggregateMetric,
    #[serde(rename = "MUSR")]
    pub musr: AggregateMetric,
    #[serde(rename = "MMLU-PRO")]
    pub mmlu_pro: AggregateMetric,
}

impl AggregateSet {
    pub fn from_fn(mut f: impl FnMut(MetricId) -> AggregateMetric) -> Self {
        Self {
            ifeval: f(MetricId::IfEval),
            bbh: f(MetricId::Bbh),
            math: f(MetricId::Math),
            gpqa: f(MetricId::Gpqa),
            musr: f(MetricId::Musr),
            mmlu_pro: f(MetricId::MmluPro),
        }
    }

    pub fn get(&self, id: MetricId) -> &AggregateMetric {
        match id {
            MetricId::IfEval => &self.ifeval,
            MetricId::Bbh => &self.bbh,
            MetricId::Math => &self.math,
            MetricId::Gpqa => &self.gpqa,
            MetricId::Musr => &self.musr,
            MetricId::MmluPro => &self.mmlu_pro,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, &AggregateMetric)> + '_ {
        MetricId::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// Output of one aggregation run. Created whole, never mutated; a new run
/// replaces the published snapshot entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    #[serde(rename = "eshmia_medio")]
    pub overall_mean: f64,
    pub timestamp: String,
    /// In rank order: composite descending, name ascending on ties.
    #[serde(rename = "lista_modelos")]
    pub models: Vec<ModelRecord>,
    #[serde(rename = "metricas_agregadas")]
    pub aggregates: AggregateSet,
    #[serde(rename = "analise_automatica")]
    pub analysis: String,
}
