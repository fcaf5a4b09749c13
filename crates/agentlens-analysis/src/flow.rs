use agentlens_core::{hours_between, EntityEvents, PullRequest};
use serde::Serialize;
use time::OffsetDateTime;

use crate::stats::Stats;

/// Pull-request throughput of one tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowSummary {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// Closed pull requests that carry a merge time.
    pub merged: usize,
    /// `merged / total` as a fraction in `[0, 1]`.
    pub merge_rate: f64,
    /// Merged pull requests only.
    pub time_to_merge: Stats,
    /// Gaps in hours between consecutive commits of the whole tool, across
    /// entities.
    pub time_between_commits: Stats,
}

pub fn summarize_flow(prs: &[PullRequest], entities: &[EntityEvents]) -> FlowSummary {
    let state_is = |pr: &PullRequest, s: &str| pr.state.eq_ignore_ascii_case(s);
    let merged: Vec<&PullRequest> = prs
        .iter()
        .filter(|pr| state_is(pr, "closed") && pr.is_merged())
        .collect();
    let merge_times: Vec<f64> = merged.iter().filter_map(|pr| pr.time_to_merge_hours()).collect();

    let mut commit_times: Vec<OffsetDateTime> = entities
        .iter()
        .flat_map(|e| e.commits.iter().filter_map(|c| c.timestamp))
        .collect();
    commit_times.sort();

    FlowSummary {
        total: prs.len(),
        open: prs.iter().filter(|pr| state_is(pr, "open")).count(),
        closed: prs.iter().filter(|pr| state_is(pr, "closed")).count(),
        merged: merged.len(),
        merge_rate: if prs.is_empty() {
            0.0
        } else {
            merged.len() as f64 / prs.len() as f64
        },
        time_to_merge: Stats::from_values(&merge_times),
        time_between_commits: Stats::from_values(&gaps(&commit_times)),
    }
}

/// Hours between neighbours of an already sorted sequence.
pub(crate) fn gaps(sorted: &[OffsetDateTime]) -> Vec<f64> {
    sorted.windows(2).map(|w| hours_between(w[0], w[1])).collect()
}
