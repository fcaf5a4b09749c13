use serde_json::Value;
use std::collections::HashSet;

use crate::bundle::{EntityRecords, ToolBundle};
use crate::event::{EntityEvents, Event, EventKind};
use crate::identity::AgentRegistry;
use crate::record::{decode, RawComment, RawCommit, RawReview};

/// Turns raw export records into classified events. Never fails: records
/// that are not JSON objects are dropped, missing fields read as empty.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    registry: &'a AgentRegistry,
}

impl<'a> Normalizer<'a> {
    pub fn new(registry: &'a AgentRegistry) -> Self {
        Self { registry }
    }

    fn classify(&self, actor: &str, kind: EventKind) -> bool {
        if actor.is_empty() {
            tracing::debug!(?kind, "unknown actor, counted as human");
        }
        self.registry.is_agent(actor)
    }

    pub fn commit(&self, value: &Value) -> Option<Event> {
        let raw: RawCommit = decode(value)?;
        let actor = raw.actor();
        let is_agent = self.classify(actor, EventKind::Commit);
        Some(Event::new(EventKind::Commit, actor, is_agent, raw.authored_at()))
    }

    pub fn comment(&self, value: &Value) -> Option<Event> {
        let raw: RawComment = decode(value)?;
        let actor = raw.actor();
        let is_agent = self.classify(actor, EventKind::Comment);
        Some(Event::new(EventKind::Comment, actor, is_agent, raw.created_at()))
    }

    pub fn review(&self, value: &Value) -> Option<Event> {
        let raw: RawReview = decode(value)?;
        let actor = raw.actor();
        let is_agent = self.classify(actor, EventKind::Review);
        Some(
            Event::new(EventKind::Review, actor, is_agent, raw.submitted_at())
                .with_approval(raw.is_approval()),
        )
    }

    /// Events of one entity across all four record streams. An id with no
    /// records anywhere yields an empty set.
    pub fn entity(&self, bundle: &ToolBundle, id: &str) -> EntityEvents {
        let commits = collect(bundle.commits.get(id), |v| self.commit(v));
        let mut comments = collect(bundle.comments.get(id), |v| self.comment(v));
        comments.extend(collect(bundle.review_comments.get(id), |v| self.comment(v)));
        let reviews = collect(bundle.reviews.get(id), |v| self.review(v));
        EntityEvents {
            entity_id: id.to_string(),
            commits,
            comments,
            reviews,
        }
    }

    /// Every entity that has records in any stream, in first-seen order
    /// (commits, comments, review comments, reviews).
    pub fn all_entities(&self, bundle: &ToolBundle) -> Vec<EntityEvents> {
        let streams: [&EntityRecords; 4] = [
            &bundle.commits,
            &bundle.comments,
            &bundle.review_comments,
            &bundle.reviews,
        ];
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in streams.into_iter().flat_map(|s| s.ids()) {
            if seen.insert(id) {
                out.push(self.entity(bundle, id));
            }
        }
        out
    }
}

fn collect<F>(records: &[Value], f: F) -> Vec<Event>
where
    F: Fn(&Value) -> Option<Event>,
{
    let events: Vec<Event> = records.iter().filter_map(f).collect();
    let skipped = records.len() - events.len();
    if skipped > 0 {
        tracing::debug!(skipped, "dropped malformed records");
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> ToolBundle {
        let mut b = ToolBundle::new("test");
        b.commits = serde_json::from_value(json!({
            "1.json": [
                {"author": {"login": "alice"}, "commit": {"author": {"name": "Alice", "date": "2024-01-01T10:00:00Z"}}},
                {"author": null, "commit": {"author": {"name": "dependabot[bot]", "date": "not a date"}}},
                "not-a-record",
                42
            ]
        }))
        .unwrap();
        b.comments = serde_json::from_value(json!({
            "1.json": [{"user": {"login": "copilot"}, "created_at": "2024-01-01T09:00:00Z"}],
            "2.json": [{"user": null, "created_at": "2024-01-02T00:00:00Z"}]
        }))
        .unwrap();
        b.review_comments = serde_json::from_value(json!({
            "1.json": [{"user": {"login": "bob"}, "created_at": "2024-01-01T11:00:00Z"}]
        }))
        .unwrap();
        b.reviews = serde_json::from_value(json!({
            "1.json": [{"user": {"login": "carol"}, "submitted_at": "2024-01-01T12:00:00Z", "state": "APPROVED"}],
            "3.json": [{"user": {"login": "coderabbit-bot"}, "state": "COMMENTED"}]
        }))
        .unwrap();
        b
    }

    #[test]
    fn entity_events_from_all_streams() {
        let reg = AgentRegistry::builtin();
        let n = Normalizer::new(&reg);
        let ev = n.entity(&bundle(), "1");

        assert_eq!(ev.commits.len(), 2);
        assert_eq!(ev.commits[0].actor, "alice");
        assert!(!ev.commits[0].is_agent);
        assert_eq!(ev.commits[1].actor, "dependabot[bot]");
        assert!(ev.commits[1].is_agent);
        assert!(ev.commits[1].timestamp.is_none());

        assert_eq!(ev.comments.len(), 2);
        assert_eq!(ev.comments[0].actor, "copilot");
        assert!(ev.comments[0].is_agent);
        assert_eq!(ev.comments[1].actor, "bob");

        assert_eq!(ev.reviews.len(), 1);
        assert!(ev.reviews[0].approved);
    }

    #[test]
    fn missing_user_is_empty_human() {
        let reg = AgentRegistry::builtin();
        let ev = Normalizer::new(&reg).entity(&bundle(), "2");
        assert_eq!(ev.comments.len(), 1);
        assert_eq!(ev.comments[0].actor, "");
        assert!(!ev.comments[0].is_agent);
    }

    #[test]
    fn list_shaped_identities_are_not_agents() {
        let reg = AgentRegistry::builtin();
        let n = Normalizer::new(&reg);
        let comment = n
            .comment(&json!({"user": ["copilot"], "created_at": "2024-01-01T00:00:00Z"}))
            .unwrap();
        assert_eq!(comment.actor, "");
        assert!(!comment.is_agent);

        let commit = n
            .commit(&json!({"commit": {"author": ["dependabot[bot]", "2024-01-01T00:00:00Z"]}}))
            .unwrap();
        assert_eq!(commit.actor, "");
        assert!(!commit.is_agent);
        assert!(commit.timestamp.is_none());
    }

    #[test]
    fn unknown_entity_is_empty() {
        let reg = AgentRegistry::builtin();
        let ev = Normalizer::new(&reg).entity(&bundle(), "404");
        assert!(ev.is_empty());
        assert_eq!(ev.entity_id, "404");
    }

    #[test]
    fn all_entities_in_first_seen_order() {
        let reg = AgentRegistry::builtin();
        let all = Normalizer::new(&reg).all_entities(&bundle());
        let ids: Vec<_> = all.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(all[2].reviews[0].is_agent);
    }
}
