//! The closed benchmark metric set and the fixed-size score vector.
//!
//! The six metrics are a closed set, so scores live in a struct with six
//! named fields instead of a string-keyed map. A record with a missing
//! metric cannot be constructed.

use serde::{Deserialize, Serialize};

/// One of the six tracked benchmark metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricId {
    IfEval,
    Bbh,
    Math,
    Gpqa,
    Musr,
    MmluPro,
}

impl MetricId {
    /// Canonical iteration order. Every per-metric loop uses this order so
    /// tie-breaking and emitted maps are reproducible across runs.
    pub const ALL: [MetricId; 6] = [
        MetricId::IfEval,
        MetricId::Bbh,
        MetricId::Math,
        MetricId::Gpqa,
        MetricId::Musr,
        MetricId::MmluPro,
    ];

    /// Wire name, as used in input records and the published document.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricId::IfEval => "IFEval",
            MetricId::Bbh => "BBH",
            MetricId::Math => "MATH",
            MetricId::Gpqa => "GPQA",
            MetricId::Musr => "MUSR",
            MetricId::MmluPro => "MMLU-PRO",
        }
    }

    pub fn parse(name: &str) -> Option<MetricId> {
        MetricId::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

/// One value per metric, metric presence guaranteed by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricVector {
    #[serde(rename = "IFEval")]
    pub ifeval: f64,
    #[serde(rename = "BBH")]
    pub bbh: f64,
    #[serde(rename = "MATH")]
    pub math: f64,
    #[serde(rename = "GPQA")]
    pub gpqa: f64,
    #[serde(rename = "MUSR")]
    pub musr: f64,
    #[serde(rename = "MMLU-PRO")]
    pub mmlu_pro: f64,
}

impl MetricVector {
    pub fn splat(value: f64) -> Self {
        Self::from_fn(|_| value)
    }

    pub fn from_fn(mut f: impl FnMut(MetricId) -> f64) -> Self {
        Self {
            ifeval: f(MetricId::IfEval),
            bbh: f(MetricId::Bbh),
            math: f(MetricId::Math),
            gpqa: f(MetricId::Gpqa),
            musr: f(MetricId::Musr),
            mmlu_pro: f(MetricId::MmluPro),
        }
    }

    /// Fallible construction; the first failing metric aborts.
    pub fn try_from_fn<E>(mut f: impl FnMut(MetricId) -> Result<f64, E>) -> Result<Self, E> {
        Ok(Self {
            ifeval: f(MetricId::IfEval)?,
            bbh: f(MetricId::Bbh)?,
            math: f(MetricId::Math)?,
            gpqa: f(MetricId::Gpqa)?,
            musr: f(MetricId::Musr)?,
            mmlu_pro: f(MetricId::MmluPro)?,
        })
    }

    pub fn get(&self, id: MetricId) -> f64 {
        match id {
            MetricId::IfEval => self.ifeval,
            MetricId::Bbh => self.bbh,
            MetricId::Math => self.math,
            MetricId::Gpqa => self.gpqa,
            MetricId::Musr => self.musr,
            MetricId::MmluPro => self.mmlu_pro,
        }
    }

    /// Values in canonical metric order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricId, f64)> + '_ {
        MetricId::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    pub fn mean(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum::<f64>() / MetricId::ALL.len() as f64
    }

    pub fn min(&self) -> f64 {
        self.iter().map(|(_, v)| v).fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.iter().map(|(_, v)| v).fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_roundtrip() {
        for m in MetricId::ALL {
            assert_eq!(MetricId::parse(m.as_str()), Some(m));
        }
        assert_eq!(MetricId::parse("MMLU"), None);
    }

    #[test]
    fn test_canonical_order_is_stable() {
        let names: Vec<&str> = MetricId::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, ["IFEval", "BBH", "MATH", "GPQA", "MUSR", "MMLU-PRO"]);
    }

    #[test]
    fn test_mean_min_max() {
        let v = MetricVector {
            ifeval: 0.9,
            bbh: 0.8,
            math: 0.7,
            gpqa: 0.6,
            musr: 0.5,
            mmlu_pro: 0.4,
        };
        assert!((v.mean() - 0.65).abs() < 1e-12);
        assert_eq!(v.min(), 0.4);
        assert_eq!(v.max(), 0.9);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let v = MetricVector::splat(1.0);
        let json = serde_json::to_value(&v).unwrap();
        for m in MetricId::ALL {
            assert_eq!(json[m.as_str()], serde_json::json!(1.0));
        }
    }

    #[test]
    fn test_try_from_fn_propagates_first_error() {
        let r: Result<MetricVector, &str> = MetricVector::try_from_fn(|m| {
            if m == MetricId::Math {
                Err("boom")
            } else {
                Ok(1.0)
            }
        });
        assert_eq!(r.unwrap_err(), "boom");
    }
}
