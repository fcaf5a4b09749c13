use std::path::{Path, PathBuf};

/// Well-known files of one tool's export directory.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    pub dir: PathBuf,
    pub prs_json: PathBuf,
    pub pr_commits_json: PathBuf,
    pub pr_comments_json: PathBuf,
    pub pr_review_comments_json: PathBuf,
    pub pr_reviews_json: PathBuf,
    pub issues_json: PathBuf,
    pub related_issues_json: PathBuf,
    pub related_issues_csv: PathBuf,
    pub developer_metadata_json: PathBuf,
    pub repo_metadata_json: PathBuf,
}

impl ExportLayout {
    /// Derive all paths from the export directory. Pure computation, no I/O.
    pub fn discover(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            prs_json: dir.join("prs.json"),
            pr_commits_json: dir.join("pr_commits.json"),
            pr_comments_json: dir.join("pr_comments.json"),
            pr_review_comments_json: dir.join("pr_review_comments.json"),
            pr_reviews_json: dir.join("pr_reviews.json"),
            issues_json: dir.join("issues.json"),
            related_issues_json: dir.join("related_issues.json"),
            related_issues_csv: dir.join("related_issues.csv"),
            developer_metadata_json: dir.join("developer_metadata.json"),
            repo_metadata_json: dir.join("repo_metadata.json"),
            dir,
        }
    }

    pub fn exists(&self) -> bool {
        self.dir.exists()
    }

    pub fn is_dir(&self) -> bool {
        self.dir.is_dir()
    }

    /// Link table source: JSON if present, else CSV.
    pub fn links_file(&self) -> Option<&Path> {
        [&self.related_issues_json, &self.related_issues_csv]
            .into_iter()
            .find(|p| p.is_file())
            .map(PathBuf::as_path)
    }
}
