//! Loads one tool's export directory into a [`ToolBundle`].
//!
//! Missing files load as empty input and undecodable files are logged and
//! skipped. Only a missing or unreadable directory fails the tool.

pub mod error;
pub mod layout;
pub mod links;

use std::path::Path;

use agentlens_core::{EntityRecords, Records, ToolBundle};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{IngestError, Result};
pub use layout::ExportLayout;

/// Load the export of tool `name` from `dir`.
pub fn load_tool(name: &str, dir: &Path) -> Result<ToolBundle> {
    let layout = ExportLayout::discover(dir);
    if !layout.exists() {
        return Err(IngestError::NotFound(layout.dir));
    }
    if !layout.is_dir() {
        return Err(IngestError::NotADirectory(layout.dir));
    }

    let mut bundle = ToolBundle::new(name);
    bundle.pull_requests = read_records(&layout.prs_json)?;
    bundle.commits = read_entity_records(&layout.pr_commits_json)?;
    bundle.comments = read_entity_records(&layout.pr_comments_json)?;
    bundle.review_comments = read_entity_records(&layout.pr_review_comments_json)?;
    bundle.reviews = read_entity_records(&layout.pr_reviews_json)?;
    bundle.issues = read_records(&layout.issues_json)?;
    bundle.links = match layout.links_file() {
        Some(path) if path == layout.related_issues_csv => links::from_csv(&read_text(path)?),
        Some(path) => read_json::<Value>(path)?
            .map(|v| links::from_json(&v))
            .unwrap_or_default(),
        None => Vec::new(),
    };
    bundle.developers = read_records(&layout.developer_metadata_json)?;
    bundle.repositories = read_records(&layout.repo_metadata_json)?;

    tracing::info!(
        tool = name,
        dir = %dir.display(),
        pull_requests = bundle.pull_requests.len(),
        commit_entities = bundle.commits.len(),
        issues = bundle.issues.len(),
        links = bundle.links.len(),
        repositories = bundle.repositories.len(),
        "loaded export"
    );
    Ok(bundle)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `Ok(None)` when the file is absent or does not decode as `T`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "export file absent");
        return Ok(None);
    }
    let text = read_text(path)?;
    match serde_json::from_str(&text) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "undecodable export file, treated as empty");
            Ok(None)
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<Value>> {
    Ok(read_json::<Records>(path)?.unwrap_or_default().into_vec())
}

fn read_entity_records(path: &Path) -> Result<EntityRecords> {
    Ok(read_json::<EntityRecords>(path)?.unwrap_or_default())
}
