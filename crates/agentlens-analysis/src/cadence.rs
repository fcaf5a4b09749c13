//! Commit cadence and review load per tool.

use std::sync::LazyLock;

use agentlens_core::record::decode;
use agentlens_core::{EntityRecords, RawCommit, ToolBundle};
use regex::Regex;
use serde::Serialize;
use time::OffsetDateTime;

use crate::flow::gaps;
use crate::stats::{mean, Stats};

/// `type(scope)!: subject` on the first line of a commit message.
static CONVENTIONAL_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert)(\([^)]*\))?!?: \S")
        .expect("valid conventional commit pattern")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CognitiveLoad {
    /// Commit messages written as conventional commits.
    pub conventional_commits: usize,
    /// Issue comments plus review comments across the tool.
    pub total_comments: usize,
    /// Per entity with two or more timed commits: the mean gap in hours
    /// between its consecutive commits.
    pub commit_interval_hours: Stats,
    /// Commit records per entity.
    pub commits_per_entity: Stats,
}

pub fn is_conventional_commit(message: &str) -> bool {
    let subject = message.lines().next().unwrap_or("").trim_start();
    CONVENTIONAL_COMMIT.is_match(subject)
}

pub fn cognitive_load(bundle: &ToolBundle) -> CognitiveLoad {
    let mut conventional = 0;
    let mut intervals = Vec::new();
    let mut churn = Vec::new();

    for (_, records) in bundle.commits.iter() {
        let commits: Vec<RawCommit> = records.iter().filter_map(decode).collect();
        conventional += commits.iter().filter(|c| is_conventional_commit(c.message())).count();

        let mut times: Vec<OffsetDateTime> = commits.iter().filter_map(RawCommit::authored_at).collect();
        if times.len() > 1 {
            times.sort();
            intervals.push(mean(&gaps(&times)));
        }
        churn.push(records.len() as f64);
    }

    CognitiveLoad {
        conventional_commits: conventional,
        total_comments: record_count(&bundle.comments) + record_count(&bundle.review_comments),
        commit_interval_hours: Stats::from_values(&intervals),
        commits_per_entity: Stats::from_values(&churn),
    }
}

fn record_count(records: &EntityRecords) -> usize {
    records.iter().map(|(_, v)| v.len()).sum()
}
