use serde::Serialize;

use crate::features::FeatureRow;
use crate::stats::mean;

/// Average workload of one bucket of pull requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Workload {
    pub count: usize,
    pub avg_comments: f64,
    pub avg_reviews: f64,
    pub avg_commits: f64,
    /// Over the merged pull requests of the bucket only.
    pub avg_time_to_merge_hours: f64,
}

impl Workload {
    fn of(rows: &[&FeatureRow]) -> Self {
        let avg = |f: fn(&FeatureRow) -> usize| {
            mean(&rows.iter().map(|r| f(r) as f64).collect::<Vec<_>>())
        };
        let merge_times: Vec<f64> = rows.iter().filter_map(|r| r.time_to_merge_hours).collect();
        Self {
            count: rows.len(),
            avg_comments: avg(|r| r.total_comments),
            avg_reviews: avg(|r| r.total_reviews),
            avg_commits: avg(|r| r.total_commits),
            avg_time_to_merge_hours: mean(&merge_times),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorkloadComparison {
    pub with_agent: Workload,
    pub without_agent: Workload,
}

pub fn compare_workload(rows: &[FeatureRow]) -> WorkloadComparison {
    let (with, without): (Vec<&FeatureRow>, Vec<&FeatureRow>) =
        rows.iter().partition(|r| r.has_agent_involvement);
    WorkloadComparison {
        with_agent: Workload::of(&with),
        without_agent: Workload::of(&without),
    }
}
