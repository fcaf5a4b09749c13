//! Raw export record schema.
//!
//! Every field is optional and decoded leniently: a field of the wrong JSON
//! type reads as absent instead of failing the record. Only a record that is
//! not a JSON object at all is rejected (see [`decode`]).

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::timestamp::parse_timestamp;

/// Decode one raw record. Non-object values yield `None`.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    T::deserialize(value).ok()
}

fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    Ok(serde_json::from_value(value).ok())
}

/// Nested records must be JSON objects. Derived struct impls would also
/// accept an array positionally, so anything else reads as absent.
fn lenient_object<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(de)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Ids show up as numbers in API dumps and as strings in CSV-derived data.
fn lenient_id<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Bare id from an export key: `"123.json"` and `"123"` both give `"123"`.
pub fn entity_key(key: &str) -> &str {
    let key = key.trim();
    key.strip_suffix(".json").unwrap_or(key)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "lenient")]
    pub login: Option<String>,
}

fn login_of(user: &Option<RawUser>) -> &str {
    user.as_ref()
        .and_then(|u| u.login.as_deref())
        .unwrap_or("")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitSignature {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
    #[serde(default, deserialize_with = "lenient_object")]
    pub author: Option<GitSignature>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCommit {
    /// Platform account linked to the commit, absent for unlinked emails.
    #[serde(default, deserialize_with = "lenient_object")]
    pub author: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub commit: Option<CommitDetail>,
}

impl RawCommit {
    fn signature(&self) -> Option<&GitSignature> {
        self.commit.as_ref().and_then(|c| c.author.as_ref())
    }

    /// Account login if present, else the git author name, else empty.
    pub fn actor(&self) -> &str {
        let login = login_of(&self.author);
        if !login.is_empty() {
            return login;
        }
        self.signature()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("")
    }

    pub fn authored_at(&self) -> Option<OffsetDateTime> {
        self.signature()
            .and_then(|s| s.date.as_deref())
            .and_then(parse_timestamp)
    }

    pub fn message(&self) -> &str {
        self.commit
            .as_ref()
            .and_then(|c| c.message.as_deref())
            .unwrap_or("")
    }
}

/// Issue comment or review comment; both share this shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    #[serde(default, deserialize_with = "lenient_object")]
    pub user: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
}

impl RawComment {
    pub fn actor(&self) -> &str {
        login_of(&self.user)
    }

    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn created_at(&self) -> Option<OffsetDateTime> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReview {
    #[serde(default, deserialize_with = "lenient_object")]
    pub user: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient")]
    pub submitted_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
}

impl RawReview {
    pub fn actor(&self) -> &str {
        login_of(&self.user)
    }

    pub fn submitted_at(&self) -> Option<OffsetDateTime> {
        self.submitted_at.as_deref().and_then(parse_timestamp)
    }

    pub fn is_approval(&self) -> bool {
        self.state
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("APPROVED"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestRef {
    #[serde(default, deserialize_with = "lenient")]
    pub merged_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPullRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub merged_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub closed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    /// Present when the record came from the issues endpoint.
    #[serde(default, deserialize_with = "lenient_object")]
    pub pull_request: Option<PullRequestRef>,
}

/// A pull request as the analyses see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequest {
    pub id: String,
    pub number: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub merged_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
    pub state: String,
}

impl PullRequest {
    /// `None` when the record has no usable id.
    pub fn from_raw(raw: RawPullRequest) -> Option<Self> {
        let id = raw.id?;
        let merged_at = raw
            .pull_request
            .as_ref()
            .and_then(|p| p.merged_at.as_deref())
            .or(raw.merged_at.as_deref())
            .and_then(parse_timestamp);
        Some(Self {
            id,
            number: raw.number,
            created_at: raw.created_at.as_deref().and_then(parse_timestamp),
            merged_at,
            closed_at: raw.closed_at.as_deref().and_then(parse_timestamp),
            state: raw.state.unwrap_or_default(),
        })
    }

    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    pub fn time_to_merge_hours(&self) -> Option<f64> {
        match (self.created_at, self.merged_at) {
            (Some(c), Some(m)) => Some(crate::timestamp::hours_between(c, m)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIssue {
    #[serde(default, deserialize_with = "lenient_id")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub closed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub user: Option<RawUser>,
}

impl RawIssue {
    pub fn reporter(&self) -> &str {
        login_of(&self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_records_are_rejected() {
        assert!(decode::<RawCommit>(&json!([1, 2])).is_none());
        assert!(decode::<RawCommit>(&json!("sha")).is_none());
        assert!(decode::<RawCommit>(&Value::Null).is_none());
    }

    #[test]
    fn commit_prefers_login_then_name() {
        let c: RawCommit = decode(&json!({
            "author": {"login": "alice"},
            "commit": {"author": {"name": "Alice A", "date": "2024-01-01T00:00:00Z"}}
        }))
        .unwrap();
        assert_eq!(c.actor(), "alice");

        let c: RawCommit = decode(&json!({
            "author": null,
            "commit": {"author": {"name": "Alice A"}}
        }))
        .unwrap();
        assert_eq!(c.actor(), "Alice A");
        assert!(c.authored_at().is_none());

        let c: RawCommit = decode(&json!({})).unwrap();
        assert_eq!(c.actor(), "");
    }

    #[test]
    fn malformed_nested_fields_degrade_to_empty() {
        let c: RawCommit = decode(&json!({
            "author": "not-an-object",
            "commit": {"author": ["weird"], "message": 5}
        }))
        .unwrap();
        assert_eq!(c.actor(), "");
        assert_eq!(c.message(), "");

        let r: RawReview = decode(&json!({"user": 42, "state": "APPROVED"})).unwrap();
        assert_eq!(r.actor(), "");
        assert!(r.is_approval());
    }

    #[test]
    fn comment_body_is_text_or_empty() {
        let c: RawComment = decode(&json!({"body": "Please fix the typo"})).unwrap();
        assert_eq!(c.body(), "Please fix the typo");
        let c: RawComment = decode(&json!({"body": {"text": "nested"}})).unwrap();
        assert_eq!(c.body(), "");
    }

    #[test]
    fn list_shaped_nested_records_read_as_absent() {
        let c: RawComment = decode(&json!({"user": ["copilot"], "created_at": "2024-01-01T00:00:00Z"})).unwrap();
        assert_eq!(c.actor(), "");

        let c: RawCommit = decode(&json!({
            "author": ["renovate"],
            "commit": {"author": ["dependabot[bot]", "2024-01-01T00:00:00Z"]}
        }))
        .unwrap();
        assert_eq!(c.actor(), "");
        assert!(c.authored_at().is_none());

        let c: RawCommit = decode(&json!({"commit": [{"author": {"name": "x"}}]})).unwrap();
        assert!(c.commit.is_none());

        let r: RawReview = decode(&json!({"user": ["coderabbitai[bot]"]})).unwrap();
        assert_eq!(r.actor(), "");

        let i: RawIssue = decode(&json!({"number": 1, "user": ["copilot"]})).unwrap();
        assert_eq!(i.reporter(), "");

        let raw: RawPullRequest = decode(&json!({
            "id": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "pull_request": ["2024-01-02T00:00:00Z"]
        }))
        .unwrap();
        assert!(raw.pull_request.is_none());
        assert!(PullRequest::from_raw(raw).unwrap().merged_at.is_none());
    }

    #[test]
    fn pull_request_merge_time_prefers_nested_ref() {
        let raw: RawPullRequest = decode(&json!({
            "id": 7,
            "created_at": "2024-01-01T00:00:00Z",
            "merged_at": "2024-01-05T00:00:00Z",
            "pull_request": {"merged_at": "2024-01-02T00:00:00Z"},
            "state": "closed"
        }))
        .unwrap();
        let pr = PullRequest::from_raw(raw).unwrap();
        assert_eq!(pr.id, "7");
        assert_eq!(pr.time_to_merge_hours(), Some(24.0));
    }

    #[test]
    fn pull_request_without_id_is_dropped() {
        let raw: RawPullRequest = decode(&json!({"state": "open"})).unwrap();
        assert!(PullRequest::from_raw(raw).is_none());
    }

    #[test]
    fn entity_keys_strip_json_suffix() {
        assert_eq!(entity_key("123.json"), "123");
        assert_eq!(entity_key("123"), "123");
        assert_eq!(entity_key(" 9.json "), "9");
    }
}
