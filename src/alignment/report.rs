use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::ThresholdConfig;
use crate::error::AssessmentError;
use crate::types::{AssessmentResult, VerdictTier, WordErrorKind};

const OUTLIER_TOP_N: usize = 10;
const SUBSTITUTION_TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub case_count: usize,
    pub thresholds: ThresholdConfig,
    pub similarity_weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub text: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    pub accuracy: Option<MetricDistribution>,
    pub frequent_substitutions: Vec<SubstitutionCount>,
    pub outliers: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateCounts {
    pub total: u32,
    pub assessed: u32,
    pub failed: u32,
    pub excellent: u32,
    pub acceptable: u32,
    pub insufficient: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f64,
    pub median: f64,
    pub p10: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionCount {
    pub expected: String,
    pub detected: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub overall_accuracy: f64,
    pub verdict_tier: VerdictTier,
}

/// Learner-facing text for one assessment.
///
/// Accuracy and per-word errors are shown only for the middle tier; the other
/// tiers get their headline alone.
pub fn render_feedback(result: &AssessmentResult) -> String {
    let mut out = result.verdict_tier.headline().to_string();
    let Some(words) = result.word_diagnostics.as_deref() else {
        return out;
    };

    let _ = write!(out, "\n\nAccuracy: {:.1}%", result.overall_accuracy);
    for word in words.iter().filter(|w| !w.errors.is_empty()) {
        let details = word
            .errors
            .iter()
            .map(|e| e.detail.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let _ = write!(
            out,
            "\n- {} ({:.0}%): {}",
            word.word, word.word_accuracy, details
        );
    }
    out
}

pub fn compute_case_report(
    id: &str,
    text: &str,
    language: &str,
    outcome: Result<AssessmentResult, AssessmentError>,
) -> CaseReport {
    let (result, feedback, error) = match outcome {
        Ok(result) => {
            let feedback = render_feedback(&result);
            (Some(result), Some(feedback), None)
        }
        Err(err) => (None, None, Some(err.to_string())),
    };
    CaseReport {
        id: id.to_string(),
        text: text.to_string(),
        language: language.to_string(),
        result,
        feedback,
        error,
    }
}

pub const REPORT_SCHEMA_VERSION: u32 = 1;

pub fn build_report(
    generated_at: String,
    thresholds: ThresholdConfig,
    similarity_weight: f64,
    cases: Vec<CaseReport>,
) -> Report {
    let aggregates = aggregate_reports(&cases);
    Report {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: Meta {
            generated_at,
            case_count: cases.len(),
            thresholds,
            similarity_weight,
        },
        cases,
        aggregates,
    }
}

pub fn aggregate_reports(cases: &[CaseReport]) -> AggregateReport {
    let results: Vec<(&str, &AssessmentResult)> = cases
        .iter()
        .filter_map(|c| c.result.as_ref().map(|r| (c.id.as_str(), r)))
        .collect();

    let mut counts = AggregateCounts {
        total: to_u32(cases.len()),
        assessed: to_u32(results.len()),
        failed: to_u32(cases.len() - results.len()),
        ..AggregateCounts::default()
    };
    for (_, result) in &results {
        match result.verdict_tier {
            VerdictTier::Excellent => counts.excellent += 1,
            VerdictTier::Acceptable => counts.acceptable += 1,
            VerdictTier::Insufficient => counts.insufficient += 1,
        }
    }

    let accuracies: Vec<f64> = results.iter().map(|(_, r)| r.overall_accuracy).collect();

    AggregateReport {
        counts,
        accuracy: distribution_or_none(&accuracies),
        frequent_substitutions: frequent_substitutions(&results, SUBSTITUTION_TOP_N),
        outliers: lowest_accuracy(&results, OUTLIER_TOP_N),
    }
}

fn frequent_substitutions(
    results: &[(&str, &AssessmentResult)],
    top_n: usize,
) -> Vec<SubstitutionCount> {
    let mut tally: HashMap<(&str, &str), u32> = HashMap::new();
    let errors = results
        .iter()
        .filter_map(|(_, r)| r.word_diagnostics.as_deref())
        .flatten()
        .flat_map(|w| w.errors.iter())
        .filter(|e| e.kind == WordErrorKind::Substitution);
    for error in errors {
        *tally
            .entry((error.expected.as_str(), error.detected.as_str()))
            .or_default() += 1;
    }

    let mut ranked: Vec<SubstitutionCount> = tally
        .into_iter()
        .map(|((expected, detected), count)| SubstitutionCount {
            expected: expected.to_string(),
            detected: detected.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.expected.cmp(&b.expected))
            .then_with(|| a.detected.cmp(&b.detected))
    });
    ranked.truncate(top_n);
    ranked
}

fn lowest_accuracy(results: &[(&str, &AssessmentResult)], top_n: usize) -> Vec<OutlierEntry> {
    let mut ranked: Vec<OutlierEntry> = results
        .iter()
        .map(|(id, r)| OutlierEntry {
            id: id.to_string(),
            overall_accuracy: r.overall_accuracy,
            verdict_tier: r.verdict_tier,
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.overall_accuracy
            .partial_cmp(&b.overall_accuracy)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.truncate(top_n);
    ranked
}

fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(MetricDistribution {
        mean: mean(&sorted),
        median: median_sorted(&sorted),
        p10: percentile_sorted(&sorted, 0.10),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median_sorted(sorted_values: &[f64]) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let mid = sorted_values.len() / 2;
    if sorted_values.len() % 2 == 0 {
        (sorted_values[mid - 1] + sorted_values[mid]) / 2.0
    } else {
        sorted_values[mid]
    }
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
