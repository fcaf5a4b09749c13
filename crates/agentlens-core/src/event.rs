use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Commit,
    Comment,
    Review,
}

/// A normalized, classified activity record. Transient: built per pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// `None` when the source date was missing or unparsable.
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    pub kind: EventKind,
    pub actor: String,
    pub is_agent: bool,
    /// Review events only: the review approved the change.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub approved: bool,
}

impl Event {
    pub fn new(
        kind: EventKind,
        actor: impl Into<String>,
        is_agent: bool,
        timestamp: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            timestamp,
            kind,
            actor: actor.into(),
            is_agent,
            approved: false,
        }
    }

    pub fn with_approval(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }

    pub fn is_human(&self) -> bool {
        !self.is_agent
    }
}

/// All events attached to one entity, per stream, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityEvents {
    pub entity_id: String,
    pub commits: Vec<Event>,
    /// Issue comments followed by review comments.
    pub comments: Vec<Event>,
    pub reviews: Vec<Event>,
}

impl EntityEvents {
    pub fn empty(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    /// Every event: commits, then comments, then reviews.
    pub fn all(&self) -> impl Iterator<Item = &Event> + Clone {
        self.commits
            .iter()
            .chain(self.comments.iter())
            .chain(self.reviews.iter())
    }

    pub fn len(&self) -> usize {
        self.commits.len() + self.comments.len() + self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_agent_involvement(&self) -> bool {
        self.all().any(|e| e.is_agent)
    }

    /// Earliest timestamped approving review.
    pub fn first_approval(&self) -> Option<OffsetDateTime> {
        self.reviews
            .iter()
            .filter(|e| e.approved)
            .filter_map(|e| e.timestamp)
            .min()
    }
}
