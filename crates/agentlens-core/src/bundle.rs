use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::record::entity_key;

// ── Ingestion boundary shapes ──

/// A top-level export that is either a JSON array of records or an
/// id-keyed object of records. Collapsed to one ordered sequence before
/// anything downstream sees it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Records {
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
}

impl Records {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Records::List(v) => v,
            Records::Map(m) => m.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

impl Default for Records {
    fn default() -> Self {
        Records::List(Vec::new())
    }
}

/// Per-entity record lists (`{"<id>.json": [record, ...]}`), in file order.
#[derive(Debug, Clone, Default)]
pub struct EntityRecords {
    entries: Vec<(String, Vec<Value>)>,
    index: HashMap<String, usize>,
}

impl EntityRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records for an entity. A value that is not a list is a
    /// malformed entry and contributes nothing, though the id is still
    /// registered.
    pub fn insert(&mut self, key: &str, value: Value) {
        let id = entity_key(key).to_string();
        let records = match value {
            Value::Array(items) => items,
            other => {
                tracing::debug!(entity = %id, kind = json_kind(&other), "skipping non-list entity records");
                Vec::new()
            }
        };
        match self.index.get(&id) {
            Some(&i) => self.entries[i].1.extend(records),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, records));
            }
        }
    }

    /// Records for one entity; empty when the entity is unknown.
    pub fn get(&self, id: &str) -> &[Value] {
        self.index
            .get(id)
            .map(|&i| self.entries[i].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries.iter().map(|(id, v)| (id.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for EntityRecords {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        let mut out = Self::new();
        for (k, v) in map {
            out.insert(&k, v);
        }
        out
    }
}

impl<'de> Deserialize<'de> for EntityRecords {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, Value>::deserialize(de)?;
        Ok(map.into())
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One row of the pull-request ↔ issue link table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLink {
    pub pr_id: String,
    pub issue_number: String,
}

impl IssueLink {
    /// Accepts numeric or string ids; `None` when either side is missing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let field = |name: &str| match value.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        Some(Self {
            pr_id: field("pr_id")?,
            issue_number: field("issue_number")?,
        })
    }
}

/// Everything the core needs from one tool's export, fully materialized.
#[derive(Debug, Clone, Default)]
pub struct ToolBundle {
    pub name: String,
    pub pull_requests: Vec<Value>,
    pub commits: EntityRecords,
    pub comments: EntityRecords,
    pub review_comments: EntityRecords,
    pub reviews: EntityRecords,
    pub issues: Vec<Value>,
    pub links: Vec<IssueLink>,
    /// Developer profiles, one record per developer.
    pub developers: Vec<Value>,
    /// Repository metadata, one record per repository.
    pub repositories: Vec<Value>,
}

impl ToolBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_accept_list_or_map() {
        let list: Records = serde_json::from_value(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(list.into_vec().len(), 2);
        let map: Records =
            serde_json::from_value(json!({"a": {"id": 1}, "b": {"id": 2}})).unwrap();
        let v = map.into_vec();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0]["id"], 1);
    }

    #[test]
    fn entity_records_normalize_keys_and_merge() {
        let recs: EntityRecords = serde_json::from_value(json!({
            "10.json": [{"x": 1}],
            "11.json": "garbage",
            "10": [{"x": 2}]
        }))
        .unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs.get("10").len(), 2);
        assert!(recs.get("11").is_empty());
        assert!(recs.get("missing").is_empty());
        assert_eq!(recs.ids().collect::<Vec<_>>(), vec!["10", "11"]);
    }

    #[test]
    fn issue_link_from_mixed_ids() {
        let link = IssueLink::from_value(&json!({"pr_id": 5, "issue_number": "12"})).unwrap();
        assert_eq!(link.pr_id, "5");
        assert_eq!(link.issue_number, "12");
        assert!(IssueLink::from_value(&json!({"pr_id": 5})).is_none());
    }
}
