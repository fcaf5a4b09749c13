//! Keyword categories over commit messages and review comment bodies.

use std::sync::LazyLock;

use agentlens_core::record::decode;
use agentlens_core::{RawComment, RawCommit, ToolBundle};
use regex::Regex;
use serde::Serialize;

use crate::stats::percentage;

/// Examples kept per category.
pub const MAX_EXAMPLES: usize = 10;
/// Characters kept per example.
pub const EXAMPLE_CHARS: usize = 100;

/// Categories in precedence order, each with its whole-word keywords.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("fix", &["fix", "bug", "error", "issue", "problem", "resolve", "correct"]),
    ("feat", &["feat", "feature", "add", "new", "implement", "introduce"]),
    ("refactor", &["refactor", "restructure", "clean", "improve", "optimize", "simplify"]),
    ("docs", &["doc", "document", "readme", "comment", "guide"]),
    ("test", &["test", "spec", "unit", "coverage", "mock"]),
    ("style", &["style", "format", "lint", "whitespace", "indent"]),
    ("chore", &["chore", "maintenance", "dependenc", "update", "version"]),
    ("build", &["build", "compile", "package", "deploy", "release"]),
    ("ci", &["ci", "travis", "jenkins", "pipeline", "workflow", "action"]),
    ("perf", &["perf", "performance", "optimiz", "speed", "fast"]),
];

static MATCHERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .map(|(_, words)| {
            Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("valid keyword pattern")
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: &'static str,
    pub count: usize,
    /// Share of all categorized texts.
    pub percentage: f64,
    /// First texts of the category, lowercased and truncated.
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPatterns {
    pub total: usize,
    /// Every category in precedence order, zero counts included.
    pub categories: Vec<CategoryCount>,
}

impl Default for TextPatterns {
    fn default() -> Self {
        tally(vec![Vec::new(); CATEGORIES.len()])
    }
}

impl TextPatterns {
    pub fn get(&self, category: &str) -> Option<&CategoryCount> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Indices of every category whose keywords occur in `text`.
pub fn matching_categories(text: &str) -> impl Iterator<Item = usize> + '_ {
    MATCHERS
        .iter()
        .enumerate()
        .filter(move |(_, re)| re.is_match(text))
        .map(|(i, _)| i)
}

/// Commit messages go to their first matching category. Review comment
/// bodies count once in every category they match.
pub fn text_patterns(bundle: &ToolBundle) -> TextPatterns {
    let mut hits: Vec<Vec<String>> = vec![Vec::new(); CATEGORIES.len()];

    for (_, records) in bundle.commits.iter() {
        for commit in records.iter().filter_map(decode::<RawCommit>) {
            let message = commit.message().to_lowercase();
            if let Some(i) = matching_categories(&message).next() {
                hits[i].push(excerpt(&message));
            };
        }
    }
    for (_, records) in bundle.review_comments.iter() {
        for comment in records.iter().filter_map(decode::<RawComment>) {
            let body = comment.body().to_lowercase();
            for i in matching_categories(&body) {
                hits[i].push(excerpt(&body));
            }
        }
    }
    tally(hits)
}

fn tally(hits: Vec<Vec<String>>) -> TextPatterns {
    let total = hits.iter().map(Vec::len).sum();
    let categories = CATEGORIES
        .iter()
        .zip(hits)
        .map(|(&(category, _), mut texts)| {
            let count = texts.len();
            texts.truncate(MAX_EXAMPLES);
            CategoryCount {
                category,
                count,
                percentage: percentage(count, total),
                examples: texts,
            }
        })
        .collect();
    TextPatterns { total, categories }
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXAMPLE_CHARS).collect()
}
