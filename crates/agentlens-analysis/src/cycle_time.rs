use agentlens_core::{hours_between, EntityEvents, PullRequest};
use serde::Serialize;

use crate::stats::Stats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CycleTimeReport {
    pub with_agent: Stats,
    pub without_agent: Stats,
}

/// Hours from creation to the first approving review, or to the merge when
/// nobody approved. `None` when either end is unknown. Not clamped: bad
/// data can produce a negative value.
pub fn cycle_time_hours(pr: &PullRequest, events: &EntityEvents) -> Option<f64> {
    let created = pr.created_at?;
    let end = events.first_approval().or(pr.merged_at)?;
    Some(hours_between(created, end))
}

/// Split cycle times by whether any agent touched the pull request.
pub fn cycle_times<'a, I>(entities: I) -> CycleTimeReport
where
    I: IntoIterator<Item = (&'a PullRequest, &'a EntityEvents)>,
{
    let mut with_agent = Vec::new();
    let mut without_agent = Vec::new();
    for (pr, events) in entities {
        let Some(hours) = cycle_time_hours(pr, events) else {
            continue;
        };
        if events.has_agent_involvement() {
            with_agent.push(hours);
        } else {
            without_agent.push(hours);
        }
    }
    CycleTimeReport {
        with_agent: Stats::from_values(&with_agent),
        without_agent: Stats::from_values(&without_agent),
    }
}
