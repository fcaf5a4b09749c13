use agentlens_core::{hours_between, EntityEvents, Event, EventKind};
use serde::Serialize;

use crate::stats::{mean, median};

pub const DEFAULT_WINDOW_HOURS: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterventionConfig {
    /// Maximum hours between the comment and the commit.
    pub window_hours: f64,
    /// Also count a human comment followed by an agent commit.
    pub count_inverse: bool,
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            count_inverse: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterventionRecord {
    pub entity_id: String,
    /// Every event of the entity, timestamped or not.
    pub total_events: usize,
    pub intervention_count: usize,
    pub intervention_rate: f64,
}

fn is_pattern(current: &Event, next: &Event, count_inverse: bool) -> bool {
    if current.kind != EventKind::Comment || next.kind != EventKind::Commit {
        return false;
    }
    (current.is_agent && next.is_human()) || (count_inverse && current.is_human() && next.is_agent)
}

/// Count adjacent "comment then commit across the agent/human line" pairs
/// in time order. Events without a timestamp are left out of the scan but
/// still count toward `total_events`.
pub fn detect<'a, I>(entity_id: &str, events: I, config: &InterventionConfig) -> InterventionRecord
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut total_events = 0;
    let mut timed: Vec<&Event> = Vec::new();
    for event in events {
        total_events += 1;
        if event.timestamp.is_some() {
            timed.push(event);
        }
    }
    // Stable: equal timestamps keep arrival order.
    timed.sort_by_key(|e| e.timestamp);

    let intervention_count = timed
        .windows(2)
        .filter(|pair| {
            let (current, next) = (pair[0], pair[1]);
            if !is_pattern(current, next, config.count_inverse) {
                return false;
            }
            match (current.timestamp, next.timestamp) {
                (Some(a), Some(b)) => hours_between(a, b) <= config.window_hours,
                _ => false,
            }
        })
        .count();

    let intervention_rate = if total_events > 0 {
        intervention_count as f64 / total_events as f64
    } else {
        0.0
    };
    tracing::debug!(entity = entity_id, total_events, intervention_count, "intervention scan");

    InterventionRecord {
        entity_id: entity_id.to_string(),
        total_events,
        intervention_count,
        intervention_rate,
    }
}

pub fn detect_entity(events: &EntityEvents, config: &InterventionConfig) -> InterventionRecord {
    detect(&events.entity_id, events.all(), config)
}

/// Tool-level roll-up over entities that have at least one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterventionStats {
    pub entities_analyzed: usize,
    pub total_interventions: usize,
    pub mean_per_entity: f64,
    pub median_per_entity: f64,
    pub mean_rate: f64,
    pub entities_with_interventions: usize,
}

pub fn summarize(records: &[InterventionRecord]) -> InterventionStats {
    let active: Vec<&InterventionRecord> = records.iter().filter(|r| r.total_events > 0).collect();
    let counts: Vec<f64> = active.iter().map(|r| r.intervention_count as f64).collect();
    let rates: Vec<f64> = active.iter().map(|r| r.intervention_rate).collect();
    InterventionStats {
        entities_analyzed: active.len(),
        total_interventions: active.iter().map(|r| r.intervention_count).sum(),
        mean_per_entity: mean(&counts),
        median_per_entity: median(&counts),
        mean_rate: mean(&rates),
        entities_with_interventions: active.iter().filter(|r| r.intervention_count > 0).count(),
    }
}
