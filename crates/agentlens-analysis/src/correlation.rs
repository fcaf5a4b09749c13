//! Spearman rank correlation over the pull-request feature table.
//!
//! A fixed battery of hypotheses pairs an attribution metric with an outcome
//! metric. Each hypothesis yields at most one [`CorrelationResult`] per tool;
//! hypotheses with too few paired observations or constant input are
//! omitted and logged, never reported as failures.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

use crate::features::FeatureRow;

pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
pub const MIN_SAMPLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AgentCommits,
    HumanCommits,
    TotalCommits,
    AgentComments,
    HumanComments,
    TotalComments,
    AgentReviews,
    TotalReviews,
    AgentPercentage,
    TimeToMerge,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::AgentCommits => "agent_commits",
            Metric::HumanCommits => "human_commits",
            Metric::TotalCommits => "total_commits",
            Metric::AgentComments => "agent_comments",
            Metric::HumanComments => "human_comments",
            Metric::TotalComments => "total_comments",
            Metric::AgentReviews => "agent_reviews",
            Metric::TotalReviews => "total_reviews",
            Metric::AgentPercentage => "agent_percentage",
            Metric::TimeToMerge => "time_to_merge_hours",
        }
    }

    /// `None` when the row has no value for this metric (unmerged PRs have
    /// no time to merge).
    pub fn value(self, row: &FeatureRow) -> Option<f64> {
        Some(match self {
            Metric::AgentCommits => row.agent_commits as f64,
            Metric::HumanCommits => row.human_commits as f64,
            Metric::TotalCommits => row.total_commits as f64,
            Metric::AgentComments => row.agent_comments as f64,
            Metric::HumanComments => row.human_comments as f64,
            Metric::TotalComments => row.total_comments as f64,
            Metric::AgentReviews => row.agent_reviews as f64,
            Metric::TotalReviews => row.total_reviews as f64,
            Metric::AgentPercentage => row.agent_percentage(),
            Metric::TimeToMerge => return row.time_to_merge_hours,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hypothesis {
    pub name: &'static str,
    pub metric_a: Metric,
    pub metric_b: Metric,
}

const fn hypothesis(name: &'static str, metric_a: Metric, metric_b: Metric) -> Hypothesis {
    Hypothesis {
        name,
        metric_a,
        metric_b,
    }
}

pub const HYPOTHESES: &[Hypothesis] = &[
    hypothesis("agent_comments_vs_total_commits", Metric::AgentComments, Metric::TotalCommits),
    hypothesis("agent_comments_vs_human_commits", Metric::AgentComments, Metric::HumanCommits),
    hypothesis("agent_reviews_vs_time_to_merge", Metric::AgentReviews, Metric::TimeToMerge),
    hypothesis("total_comments_vs_time_to_merge", Metric::TotalComments, Metric::TimeToMerge),
    hypothesis("total_reviews_vs_total_commits", Metric::TotalReviews, Metric::TotalCommits),
    hypothesis("agent_commits_vs_human_comments", Metric::AgentCommits, Metric::HumanComments),
    hypothesis("agent_percentage_vs_time_to_merge", Metric::AgentPercentage, Metric::TimeToMerge),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    pub fn of(rho: f64) -> Self {
        let r = rho.abs();
        if r > 0.5 {
            Strength::Strong
        } else if r > 0.3 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub hypothesis: String,
    pub metric_a: String,
    pub metric_b: String,
    pub rho: f64,
    pub p_value: f64,
    pub n: usize,
    pub significant: bool,
    pub strength: Strength,
}

/// Why a hypothesis produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Omitted {
    #[error("insufficient sample: {0} paired observations, need {min}", min = MIN_SAMPLE)]
    InsufficientSample(usize),
    #[error("numeric degeneracy: {0}")]
    Degenerate(&'static str),
}

/// Average ranks (1-based), ties sharing the mean of their positions.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = avg;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> Result<f64, Omitted> {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(Omitted::Degenerate("constant input"));
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Spearman's rho with a two-sided p-value from Student's t on `n - 2`
/// degrees of freedom. A perfect monotone relation has `p = 0`.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<(f64, f64), Omitted> {
    let n = x.len().min(y.len());
    if n < MIN_SAMPLE {
        return Err(Omitted::InsufficientSample(n));
    }
    let rho = pearson(&rank(&x[..n]), &rank(&y[..n]))?;
    let df = (n - 2) as f64;
    let denom = (1.0 - rho) * (1.0 + rho);
    if denom <= 0.0 {
        return Ok((rho, 0.0));
    }
    let t = rho * (df / denom).sqrt();
    if !t.is_finite() {
        return Err(Omitted::Degenerate("non-finite t statistic"));
    }
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| Omitted::Degenerate("invalid t distribution"))?;
    let p = (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0);
    if p.is_nan() {
        return Err(Omitted::Degenerate("p-value is NaN"));
    }
    Ok((rho, p))
}

pub fn test_hypothesis(h: &Hypothesis, rows: &[FeatureRow]) -> Result<CorrelationResult, Omitted> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = rows
        .iter()
        .filter_map(|row| Some((h.metric_a.value(row)?, h.metric_b.value(row)?)))
        .unzip();
    let (rho, p_value) = spearman(&xs, &ys)?;
    Ok(CorrelationResult {
        hypothesis: h.name.to_string(),
        metric_a: h.metric_a.name().to_string(),
        metric_b: h.metric_b.name().to_string(),
        rho,
        p_value,
        n: xs.len(),
        significant: p_value < SIGNIFICANCE_LEVEL,
        strength: Strength::of(rho),
    })
}

/// Run every hypothesis in [`HYPOTHESES`] order, dropping the omitted ones.
pub fn correlate(tool: &str, rows: &[FeatureRow]) -> Vec<CorrelationResult> {
    HYPOTHESES
        .iter()
        .filter_map(|h| match test_hypothesis(h, rows) {
            Ok(result) => Some(result),
            Err(reason) => {
                tracing::warn!(tool, hypothesis = h.name, %reason, "hypothesis omitted");
                None
            }
        })
        .collect()
}
