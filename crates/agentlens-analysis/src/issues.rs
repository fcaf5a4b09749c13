//! Issue reporters and the issues linked to pull requests.

use std::collections::HashMap;

use agentlens_core::{parse_timestamp, AgentRegistry, IssueLink, RawIssue};
use serde::Serialize;
use time::OffsetDateTime;

use crate::attribution::{AttributionSummary, EntityAttribution, IdentityCounter, RankedIdentity};
use crate::stats::percentage;

/// Length of the ranked agent-reporter list.
pub const TOP_AGENT_REPORTERS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReporterSummary {
    pub total_issues: usize,
    pub agent_reported: usize,
    pub human_reported: usize,
    pub agent_percentage: f64,
    pub distinct_agent_reporters: usize,
    pub distinct_human_reporters: usize,
    pub top_human_reporters: Vec<RankedIdentity>,
    pub top_agent_reporters: Vec<RankedIdentity>,
}

/// Classify the reporting user of every issue. Issues without a reporter
/// count as human-reported but never rank.
pub fn summarize_reporters(issues: &[RawIssue], registry: &AgentRegistry, top_n: usize) -> ReporterSummary {
    let mut agents = IdentityCounter::default();
    let mut humans = IdentityCounter::default();
    let mut anonymous = 0;
    for issue in issues {
        let reporter = issue.reporter();
        if reporter.is_empty() {
            anonymous += 1;
        } else if registry.is_agent(reporter) {
            agents.bump(reporter);
        } else {
            humans.bump(reporter);
        }
    }
    let agent_reported = agents.total();
    let human_reported = humans.total() + anonymous;
    ReporterSummary {
        total_issues: issues.len(),
        agent_reported,
        human_reported,
        agent_percentage: percentage(agent_reported, issues.len()),
        distinct_agent_reporters: agents.len(),
        distinct_human_reporters: humans.len(),
        top_human_reporters: humans.ranked(top_n),
        top_agent_reporters: agents.ranked(TOP_AGENT_REPORTERS),
    }
}

/// An issue together with the attribution of a pull request linked to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueAttribution {
    pub issue_number: String,
    pub title: String,
    pub reporter: String,
    pub reporter_is_agent: bool,
    pub state: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
    pub pr_id: String,
    pub commits: AttributionSummary,
    pub comments: AttributionSummary,
    pub reviews: AttributionSummary,
    pub has_agent_involvement: bool,
    pub agent_identities: Vec<String>,
}

/// One row per link whose issue exists. When several issues share a
/// number the first one wins. `attribution` resolves a pull-request id.
pub fn link_issues<F>(
    issues: &[RawIssue],
    links: &[IssueLink],
    registry: &AgentRegistry,
    attribution: F,
) -> Vec<IssueAttribution>
where
    F: Fn(&str) -> EntityAttribution,
{
    let mut by_number: HashMap<&str, &RawIssue> = HashMap::new();
    for issue in issues {
        if let Some(number) = issue.number.as_deref() {
            by_number.entry(number).or_insert(issue);
        }
    }

    let mut rows = Vec::new();
    for link in links {
        let Some(issue) = by_number.get(link.issue_number.as_str()) else {
            tracing::debug!(issue = %link.issue_number, pr = %link.pr_id, "link to unknown issue skipped");
            continue;
        };
        let pr = attribution(&link.pr_id);
        let reporter = issue.reporter();
        rows.push(IssueAttribution {
            issue_number: link.issue_number.clone(),
            title: issue.title.clone().unwrap_or_default(),
            reporter: reporter.to_string(),
            reporter_is_agent: registry.is_agent(reporter),
            state: issue.state.clone().unwrap_or_default(),
            created_at: issue.created_at.as_deref().and_then(parse_timestamp),
            closed_at: issue.closed_at.as_deref().and_then(parse_timestamp),
            pr_id: link.pr_id.clone(),
            has_agent_involvement: pr.has_agent_involvement,
            agent_identities: pr.agent_identities,
            commits: pr.commits,
            comments: pr.comments,
            reviews: pr.reviews,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::attribute_entity;
    use agentlens_core::record::decode;
    use agentlens_core::{EntityEvents, Event, EventKind};
    use serde_json::json;

    fn issue(number: u64, login: Option<&str>) -> RawIssue {
        let user = login.map(|l| json!({"login": l})).unwrap_or(serde_json::Value::Null);
        decode(&json!({
            "number": number,
            "title": format!("issue {number}"),
            "state": "open",
            "created_at": "2024-03-01T00:00:00Z",
            "user": user,
        }))
        .unwrap()
    }

    #[test]
    fn reporters_split_and_rank() {
        let issues = vec![
            issue(1, Some("alice")),
            issue(2, Some("renovate[bot]")),
            issue(3, Some("alice")),
            issue(4, None),
            issue(5, Some("renovate[bot]")),
            issue(6, Some("copilot")),
        ];
        let s = summarize_reporters(&issues, &AgentRegistry::builtin(), 10);
        assert_eq!(s.total_issues, 6);
        assert_eq!(s.agent_reported, 3);
        assert_eq!(s.human_reported, 3);
        assert_eq!(s.agent_percentage, 50.0);
        assert_eq!(s.distinct_agent_reporters, 2);
        assert_eq!(s.distinct_human_reporters, 1);
        assert_eq!(s.top_agent_reporters[0].identity, "renovate[bot]");
        assert_eq!(s.top_agent_reporters[0].count, 2);
        assert_eq!(s.top_human_reporters.len(), 1);
    }

    #[test]
    fn links_to_unknown_issues_are_skipped() {
        let issues = vec![issue(10, Some("alice"))];
        let links = vec![
            IssueLink { pr_id: "7".into(), issue_number: "10".into() },
            IssueLink { pr_id: "8".into(), issue_number: "99".into() },
        ];
        let lookup = |id: &str| {
            let mut ev = EntityEvents::empty(id);
            if id == "7" {
                ev.reviews.push(Event::new(EventKind::Review, "coderabbitai[bot]", true, None));
            }
            attribute_entity(&ev, 10)
        };
        let rows = link_issues(&issues, &links, &AgentRegistry::builtin(), lookup);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.issue_number, "10");
        assert_eq!(row.title, "issue 10");
        assert_eq!(row.pr_id, "7");
        assert!(!row.reporter_is_agent);
        assert!(row.has_agent_involvement);
        assert_eq!(row.reviews.agent_count, 1);
        assert_eq!(row.agent_identities, vec!["coderabbitai[bot]"]);
        assert!(row.created_at.is_some());
        assert!(row.closed_at.is_none());
    }
}
