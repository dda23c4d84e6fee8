//! Qualitative ecosystem analysis text.
//!
//! Produces the `analise_automatica` narrative from one snapshot's
//! aggregates: ecosystem mean versus human parity, strongest and weakest
//! competence, and the leading model. The output wording is displayed
//! verbatim by the dashboard, so it is part of the data contract and stays
//! in Portuguese.

use crate::metrics::MetricId;
use crate::snapshot::{AggregateSet, ModelRecord};

/// Semantic competence behind each benchmark: (display label, skill phrase).
fn competence(metric: MetricId) -> (&'static str, &'static str) {
    match metric {
        MetricId::IfEval => ("Obediência (seguir instruções)", "seguir instruções"),
        MetricId::Bbh => ("Raciocínio (lógica)", "lógica"),
        MetricId::Math => ("Cálculo (matemática)", "matemática"),
        MetricId::Gpqa => ("Ciência (nível acadêmico)", "nível acadêmico"),
        MetricId::Musr => ("Diálogo (interação complexa)", "interação complexa"),
        MetricId::MmluPro => ("Conhecimento (profissional)", "profissional"),
    }
}

/// Display form of a canonical model name: dashes to spaces, title case.
fn display_name(canonical: &str) -> String {
    let spaced = canonical.replace('-', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev_alpha = false;
    for ch in spaced.chars() {
        if ch.is_alphabetic() && !prev_alpha {
            out.extend(ch.to_uppercase());
        } else if ch.is_alphabetic() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}

/// Build the narrative. `ranked` must be in rank order, so the leading model
/// is the first entry.
pub fn generate_analysis(
    ranked: &[ModelRecord],
    overall_mean: f64,
    aggregates: &AggregateSet,
) -> String {
    let leader = match ranked.first() {
        Some(leader) => leader,
        None => {
            return "Dados insuficientes para gerar a análise qualitativa do ecossistema."
                .to_string()
        }
    };

    // Stable sort by mean descending; equal means keep canonical order.
    let mut by_mean: Vec<(f64, MetricId)> = aggregates
        .iter()
        .map(|(metric, agg)| (agg.mean, metric))
        .collect();
    by_mean.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let (best_mean, best_metric) = by_mean[0];
    let (worst_mean, worst_metric) = by_mean[by_mean.len() - 1];
    let (best_label, best_skill) = competence(best_metric);
    let (worst_label, worst_skill) = competence(worst_metric);

    format!(
        "Monitoramento do Ecossistema de IA:\n\n\
         Atualmente, os modelos de Inteligência Artificial monitorados apresentam uma \
         eficiência média de {:.1}% em relação à performance humana de referência (1.0).\n\n\
         Na análise qualitativa das competências, o ecossistema mostra maior maturidade em \
         **{}**, atingindo {:.1}% do nível humano. Isso indica que as IAs já estão altamente \
         capazes de {}.\n\n\
         Por outro lado, o maior desafio atual reside na competência de **{}**, onde a média \
         do ecossistema é de {:.1}%. Ainda existe uma lacuna significativa para atingir a \
         paridade humana em habilidades de {}.\n\n\
         O modelo de referência atual é o **{}**, com um ESHMIA individual de {:.4}, \
         representando o estado da arte na aproximação das capacidades cognitivas humanas.",
        overall_mean * 100.0,
        best_label,
        best_mean * 100.0,
        best_skill,
        worst_label,
        worst_mean * 100.0,
        worst_skill,
        display_name(&leader.name),
        leader.composite,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricVector;
    use crate::snapshot::{AggregateMetric, MetricExtreme};

    fn aggregates_with_means(means: [f64; 6]) -> AggregateSet {
        let mut i = 0;
        AggregateSet::from_fn(|_| {
            let mean = means[i];
            i += 1;
            AggregateMetric {
                mean,
                max: MetricExtreme {
                    model: "a".to_string(),
                    value: mean,
                },
                min: MetricExtreme {
                    model: "a".to_string(),
                    value: mean,
                },
            }
        })
    }

    fn model(name: &str, composite: f64) -> ModelRecord {
        ModelRecord {
            name: name.to_string(),
            composite,
            normalized: MetricVector::splat(composite),
        }
    }

    #[test]
    fn test_empty_models_yields_insufficient_data() {
        let text = generate_analysis(&[], 0.0, &aggregates_with_means([0.0; 6]));
        assert_eq!(
            text,
            "Dados insuficientes para gerar a análise qualitativa do ecossistema."
        );
    }

    #[test]
    fn test_best_and_worst_competences_named() {
        // IFEval strongest, MMLU-PRO weakest
        let aggregates = aggregates_with_means([0.9, 0.8, 0.7, 0.6, 0.5, 0.4]);
        let text = generate_analysis(&[model("gpt-4o", 0.65)], 0.65, &aggregates);
        assert!(text.contains("**Obediência (seguir instruções)**"));
        assert!(text.contains("90.0% do nível humano"));
        assert!(text.contains("**Conhecimento (profissional)**"));
        assert!(text.contains("média do ecossistema é de 40.0%"));
    }

    #[test]
    fn test_leader_name_is_title_cased() {
        let aggregates = aggregates_with_means([0.5; 6]);
        let text = generate_analysis(&[model("llama-3-70b", 0.72)], 0.72, &aggregates);
        assert!(text.contains("**Llama 3 70B**"));
        assert!(text.contains("0.7200"));
    }

    #[test]
    fn test_overall_mean_rendered_as_percentage() {
        let aggregates = aggregates_with_means([0.5; 6]);
        let text = generate_analysis(&[model("a", 0.651)], 0.651, &aggregates);
        assert!(text.contains("65.1%"));
    }

    #[test]
    fn test_display_name_title_cases_words() {
        // A letter after a digit also gets capitalized, matching str.title().
        assert_eq!(display_name("gpt-4o"), "Gpt 4O");
        assert_eq!(display_name("claude-sonnet"), "Claude Sonnet");
    }
}
