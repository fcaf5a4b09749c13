use agentlens_core::{EntityEvents, Event};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::stats::percentage;

/// Default length of ranked identity lists.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedIdentity {
    pub identity: String,
    pub count: usize,
}

/// Counts per identity, remembering first-seen order so that ranking ties
/// resolve the same way on every run.
#[derive(Debug, Default)]
pub(crate) struct IdentityCounter {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl IdentityCounter {
    pub(crate) fn bump(&mut self, identity: &str) {
        match self.index.get(identity) {
            Some(&i) => self.order[i].1 += 1,
            None => {
                self.index.insert(identity.to_string(), self.order.len());
                self.order.push((identity.to_string(), 1));
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn total(&self) -> usize {
        self.order.iter().map(|(_, c)| c).sum()
    }

    /// Highest counts first; stable, so ties keep first-seen order.
    pub(crate) fn ranked(&self, limit: usize) -> Vec<RankedIdentity> {
        let mut ranked: Vec<&(String, usize)> = self.order.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(limit)
            .map(|(identity, count)| RankedIdentity {
                identity: identity.clone(),
                count: *count,
            })
            .collect()
    }
}

/// Agent vs human split over some set of events.
///
/// `agent_count + human_count == total` always holds. Events with an empty
/// actor count as human, and the empty identity is one distinct human, but
/// it never ranks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributionSummary {
    pub agent_count: usize,
    pub human_count: usize,
    pub total: usize,
    pub agent_percentage: f64,
    pub distinct_agent_identities: usize,
    pub distinct_human_identities: usize,
    pub top_human_identities: Vec<RankedIdentity>,
}

impl AttributionSummary {
    pub fn has_agent_involvement(&self) -> bool {
        self.agent_count > 0
    }
}

pub fn aggregate<'a, I>(events: I) -> AttributionSummary
where
    I: IntoIterator<Item = &'a Event>,
{
    aggregate_top(events, DEFAULT_TOP_N)
}

/// Fold events into a summary, ranking at most `top_n` human identities.
/// Classification comes from each event's `is_agent` flag.
pub fn aggregate_top<'a, I>(events: I, top_n: usize) -> AttributionSummary
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut agent_count = 0;
    let mut human_count = 0;
    let mut agents: HashSet<&str> = HashSet::new();
    let mut humans: HashSet<&str> = HashSet::new();
    let mut human_counts = IdentityCounter::default();

    for event in events {
        if event.is_agent {
            agent_count += 1;
            agents.insert(event.actor.as_str());
        } else {
            human_count += 1;
            humans.insert(event.actor.as_str());
            if !event.actor.is_empty() {
                human_counts.bump(&event.actor);
            }
        }
    }

    let total = agent_count + human_count;
    AttributionSummary {
        agent_count,
        human_count,
        total,
        agent_percentage: percentage(agent_count, total),
        distinct_agent_identities: agents.len(),
        distinct_human_identities: humans.len(),
        top_human_identities: human_counts.ranked(top_n),
    }
}

/// Attribution of a single pull request or issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityAttribution {
    pub entity_id: String,
    pub commits: AttributionSummary,
    pub comments: AttributionSummary,
    pub reviews: AttributionSummary,
    pub overall: AttributionSummary,
    pub has_agent_involvement: bool,
    /// Mean of the agent share of commits and the agent share of comments.
    pub involvement_percentage: f64,
    /// Agent identities seen on the entity, sorted.
    pub agent_identities: Vec<String>,
}

pub fn attribute_entity(events: &EntityEvents, top_n: usize) -> EntityAttribution {
    let commits = aggregate_top(&events.commits, top_n);
    let comments = aggregate_top(&events.comments, top_n);
    let reviews = aggregate_top(&events.reviews, top_n);
    let overall = aggregate_top(events.all(), top_n);
    let agent_identities: BTreeSet<&str> = events
        .all()
        .filter(|e| e.is_agent)
        .map(|e| e.actor.as_str())
        .collect();
    EntityAttribution {
        entity_id: events.entity_id.clone(),
        involvement_percentage: (commits.agent_percentage + comments.agent_percentage) / 2.0,
        has_agent_involvement: overall.has_agent_involvement(),
        agent_identities: agent_identities.into_iter().map(String::from).collect(),
        commits,
        comments,
        reviews,
        overall,
    }
}

/// Whole-tool attribution per stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolAttribution {
    pub commits: AttributionSummary,
    pub comments: AttributionSummary,
    pub reviews: AttributionSummary,
}

pub fn attribute_tool(entities: &[EntityEvents], top_n: usize) -> ToolAttribution {
    ToolAttribution {
        commits: aggregate_top(entities.iter().flat_map(|e| &e.commits), top_n),
        comments: aggregate_top(entities.iter().flat_map(|e| &e.comments), top_n),
        reviews: aggregate_top(entities.iter().flat_map(|e| &e.reviews), top_n),
    }
}
