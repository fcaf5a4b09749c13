//! Review feedback loop: how much review a pull request gets and how soon.

use agentlens_core::{hours_between, EntityEvents, PullRequest};
use serde::Serialize;

use crate::stats::Stats;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackLoop {
    /// Every pull request with a creation and a merge time.
    pub time_to_merge_hours: Stats,
    pub reviews_per_pr: Stats,
    /// Issue comments plus review comments.
    pub comments_per_pr: Stats,
    /// Creation to the first review in arrival order, when that review is
    /// timestamped.
    pub time_to_first_review_hours: Stats,
    /// Creation to the last review in arrival order.
    pub review_time_hours: Stats,
}

/// One sample per pull request; `pairs` yields each pull request with its
/// own events.
pub fn feedback_loop<'a, I>(pairs: I) -> FeedbackLoop
where
    I: IntoIterator<Item = (&'a PullRequest, &'a EntityEvents)>,
{
    let mut merge = Vec::new();
    let mut reviews = Vec::new();
    let mut comments = Vec::new();
    let mut first_review = Vec::new();
    let mut review_time = Vec::new();

    for (pr, events) in pairs {
        if let Some(h) = pr.time_to_merge_hours() {
            merge.push(h);
        }
        reviews.push(events.reviews.len() as f64);
        comments.push(events.comments.len() as f64);

        let Some(created) = pr.created_at else {
            continue;
        };
        if let Some(at) = events.reviews.first().and_then(|r| r.timestamp) {
            first_review.push(hours_between(created, at));
        }
        if let Some(at) = events.reviews.last().and_then(|r| r.timestamp) {
            review_time.push(hours_between(created, at));
        }
    }

    FeedbackLoop {
        time_to_merge_hours: Stats::from_values(&merge),
        reviews_per_pr: Stats::from_values(&reviews),
        comments_per_pr: Stats::from_values(&comments),
        time_to_first_review_hours: Stats::from_values(&first_review),
        review_time_hours: Stats::from_values(&review_time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlens_core::{parse_timestamp, Event, EventKind};

    fn pr(id: &str, created: Option<&str>, merged: Option<&str>) -> PullRequest {
        PullRequest {
            id: id.into(),
            number: None,
            created_at: created.and_then(parse_timestamp),
            merged_at: merged.and_then(parse_timestamp),
            closed_at: None,
            state: "closed".into(),
        }
    }

    fn review(at: Option<&str>) -> Event {
        Event::new(EventKind::Review, "carol", false, at.and_then(parse_timestamp))
    }

    #[test]
    fn first_and_last_review_follow_arrival_order() {
        let p = pr("1", Some("2024-01-01T00:00:00Z"), Some("2024-01-02T00:00:00Z"));
        let mut events = EntityEvents::empty("1");
        // Arrival order, not time order.
        events.reviews.push(review(Some("2024-01-01T05:00:00Z")));
        events.reviews.push(review(Some("2024-01-01T02:00:00Z")));
        events.reviews.push(review(Some("2024-01-01T09:00:00Z")));
        events.comments.push(Event::new(EventKind::Comment, "copilot", true, None));

        let f = feedback_loop([(&p, &events)]);
        assert_eq!(f.time_to_merge_hours.mean, 24.0);
        assert_eq!(f.reviews_per_pr.mean, 3.0);
        assert_eq!(f.comments_per_pr.mean, 1.0);
        assert_eq!(f.time_to_first_review_hours.mean, 5.0);
        assert_eq!(f.review_time_hours.mean, 9.0);
    }

    #[test]
    fn counts_cover_every_pull_request_but_timings_need_dates() {
        let dated = pr("1", Some("2024-01-01T00:00:00Z"), None);
        let undated = pr("2", None, None);
        let mut reviewed = EntityEvents::empty("2");
        reviewed.reviews.push(review(Some("2024-01-01T03:00:00Z")));
        let mut untimed = EntityEvents::empty("1");
        untimed.reviews.push(review(None));

        let f = feedback_loop([(&dated, &untimed), (&undated, &reviewed)]);
        assert_eq!(f.reviews_per_pr.count, 2);
        assert_eq!(f.comments_per_pr.count, 2);
        assert_eq!(f.comments_per_pr.mean, 0.0);
        assert_eq!(f.time_to_merge_hours.count, 0);
        assert_eq!(f.time_to_first_review_hours.count, 0);
        assert_eq!(f.review_time_hours.count, 0);
    }

    #[test]
    fn no_pull_requests() {
        assert_eq!(feedback_loop(std::iter::empty()), FeedbackLoop::default());
    }
}
