use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Who used the tool, and on which repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub developers: usize,
    pub repositories: usize,
    /// Repository languages, one entry per repository that names one.
    pub languages: Vec<String>,
    pub unique_languages: usize,
    /// Most common language; ties go to the one seen first.
    pub primary_language: Option<String>,
    pub total_stars: u64,
    pub total_forks: u64,
}

pub fn summarize_profile(developers: &[Value], repositories: &[Value]) -> ProfileSummary {
    let mut languages = Vec::new();
    let mut stars = 0;
    let mut forks = 0;
    for repo in repositories.iter().filter(|r| r.is_object()) {
        if let Some(lang) = repo.get("language").and_then(Value::as_str).filter(|l| !l.is_empty()) {
            languages.push(lang.to_string());
        }
        stars += count_field(repo, "stargazers_count");
        forks += count_field(repo, "forks_count");
    }

    let mut tally: HashMap<&str, usize> = HashMap::new();
    for lang in &languages {
        *tally.entry(lang.as_str()).or_default() += 1;
    }
    let mut primary: Option<(&str, usize)> = None;
    for lang in &languages {
        let n = tally[lang.as_str()];
        if primary.map_or(true, |(_, best)| n > best) {
            primary = Some((lang.as_str(), n));
        }
    }

    ProfileSummary {
        developers: developers.len(),
        repositories: repositories.len(),
        unique_languages: tally.len(),
        primary_language: primary.map(|(l, _)| l.to_string()),
        languages,
        total_stars: stars,
        total_forks: forks,
    }
}

fn count_field(record: &Value, name: &str) -> u64 {
    record.get(name).and_then(Value::as_u64).unwrap_or(0)
}
