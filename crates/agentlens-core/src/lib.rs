pub mod bundle;
pub mod event;
pub mod identity;
pub mod normalize;
pub mod record;
pub mod timestamp;

pub use bundle::{EntityRecords, IssueLink, Records, ToolBundle};
pub use event::{EntityEvents, Event, EventKind};
pub use identity::{is_agent, AgentRegistry};
pub use normalize::Normalizer;
pub use record::{PullRequest, RawComment, RawCommit, RawIssue, RawPullRequest, RawReview};
pub use timestamp::{hours_between, parse_timestamp};
