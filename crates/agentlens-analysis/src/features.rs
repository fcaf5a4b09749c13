use agentlens_core::PullRequest;
use serde::Serialize;

use crate::attribution::EntityAttribution;

/// One pull request as a row of numeric features for correlation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub pr_id: String,
    pub total_commits: usize,
    pub agent_commits: usize,
    pub human_commits: usize,
    pub agent_commits_percentage: f64,
    pub total_comments: usize,
    pub agent_comments: usize,
    pub human_comments: usize,
    pub agent_comments_percentage: f64,
    pub total_reviews: usize,
    pub agent_reviews: usize,
    pub human_reviews: usize,
    pub agent_reviews_percentage: f64,
    pub time_to_merge_hours: Option<f64>,
    pub has_related_issue: bool,
    pub has_agent_involvement: bool,
    pub is_merged: bool,
}

impl FeatureRow {
    pub fn build(pr: &PullRequest, attribution: &EntityAttribution, has_related_issue: bool) -> Self {
        let (c, m, r) = (&attribution.commits, &attribution.comments, &attribution.reviews);
        Self {
            pr_id: pr.id.clone(),
            total_commits: c.total,
            agent_commits: c.agent_count,
            human_commits: c.human_count,
            agent_commits_percentage: c.agent_percentage,
            total_comments: m.total,
            agent_comments: m.agent_count,
            human_comments: m.human_count,
            agent_comments_percentage: m.agent_percentage,
            total_reviews: r.total,
            agent_reviews: r.agent_count,
            human_reviews: r.human_count,
            agent_reviews_percentage: r.agent_percentage,
            time_to_merge_hours: pr.time_to_merge_hours(),
            has_related_issue,
            has_agent_involvement: attribution.has_agent_involvement,
            is_merged: pr.is_merged(),
        }
    }

    /// Mean of the agent commit share and the agent comment share.
    pub fn agent_percentage(&self) -> f64 {
        (self.agent_commits_percentage + self.agent_comments_percentage) / 2.0
    }
}
