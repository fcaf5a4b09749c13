use regex::Regex;

/// Known agent and service account names, matched as lower-case substrings.
///
/// Covers AI coding assistants, review bots, dependency updaters, CI and
/// hosting integrations.
pub const KNOWN_AGENTS: &[&str] = &[
    "copilot",
    "claude",
    "cursor",
    "codecov",
    "changeset-bot",
    "dependabot",
    "renovate",
    "github-actions",
    "greenkeeper",
    "imgbot",
    "stale",
    "semantic-release-bot",
    "allcontributors",
    "gitguardian",
    "snyk-bot",
    "codefactor-io",
    "codacy",
    "deepsource-io",
    "sonarcloud",
    "lgtm-com",
    "circleci",
    "travis-ci",
    "netlify",
    "vercel",
    "heroku",
    "gitlab-bot",
    "bitbucket-pipelines",
    "azure-pipelines",
    "jenkins",
    "bugbot",
    "greptile",
    "ellipsis",
    "cubic",
    "gemini",
];

/// Marker GitHub appends to app accounts, e.g. `dependabot[bot]`.
pub const BOT_MARKER: &str = "[bot]";

const SUFFIXES: &[&str] = &["-bot", "-agent", "-ci"];
const INFIXES: &[&str] = &["bot-"];

/// Classify an identity with the built-in registry only.
///
/// Case-insensitive, total, and deterministic. The empty string is human.
pub fn is_agent(identity: &str) -> bool {
    if identity.is_empty() {
        return false;
    }
    builtin_match(&identity.to_lowercase())
}

fn builtin_match(lower: &str) -> bool {
    lower.contains(BOT_MARKER)
        || KNOWN_AGENTS.iter().any(|name| lower.contains(name))
        || SUFFIXES.iter().any(|s| lower.ends_with(s))
        || INFIXES.iter().any(|s| lower.contains(s))
}

/// Immutable classifier: the built-in registry plus operator-supplied
/// names and patterns. Built once per run and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    extra_names: Vec<String>,
    extra_patterns: Vec<Regex>,
}

impl AgentRegistry {
    /// Registry with only the built-in names and naming conventions.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Extend the registry. Names are lower-cased and matched as substrings;
    /// patterns are regular expressions matched against the lower-cased
    /// identity.
    pub fn with_extras(names: &[String], patterns: &[String]) -> Result<Self, regex::Error> {
        let extra_names = names
            .iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        let extra_patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            extra_names,
            extra_patterns,
        })
    }

    pub fn is_agent(&self, identity: &str) -> bool {
        if identity.is_empty() {
            return false;
        }
        let lower = identity.to_lowercase();
        builtin_match(&lower)
            || self.extra_names.iter().any(|n| lower.contains(n.as_str()))
            || self.extra_patterns.iter().any(|re| re.is_match(&lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identity_is_human() {
        assert!(!is_agent(""));
        assert!(!AgentRegistry::builtin().is_agent(""));
    }

    #[test]
    fn bracketed_marker_any_case() {
        assert!(is_agent("dependabot[bot]"));
        assert!(is_agent("Some-App[BOT]"));
        assert!(is_agent("x[Bot]y"));
    }

    #[test]
    fn registry_names_match_as_substrings() {
        assert!(is_agent("Copilot"));
        assert!(is_agent("claude-code-action"));
        assert!(is_agent("renovate-runner"));
        assert!(is_agent("GitHub-Actions"));
    }

    #[test]
    fn naming_conventions() {
        assert!(is_agent("release-bot"));
        assert!(is_agent("bot-reviewer"));
        assert!(is_agent("deploy-agent"));
        assert!(is_agent("nightly-ci"));
    }

    #[test]
    fn plain_human_logins() {
        for login in ["octocat", "torvalds", "alice", "bob-smith", "robotics-fan"] {
            assert!(!is_agent(login), "{login} misclassified");
        }
    }

    #[test]
    fn convention_needs_exact_suffix() {
        // "-bots" is not "-bot" at the end, and there's no "bot-" infix
        assert!(!is_agent("many-bots"));
        assert!(!is_agent("agentsmith"));
    }

    #[test]
    fn extras_extend_builtin() {
        let reg = AgentRegistry::with_extras(
            &["Internal-Helper".to_string()],
            &[r"^svc_\d+$".to_string()],
        )
        .unwrap();
        assert!(reg.is_agent("internal-helper"));
        assert!(reg.is_agent("SVC_42"));
        assert!(reg.is_agent("dependabot[bot]"));
        assert!(!reg.is_agent("svc_x"));
        assert!(!reg.is_agent("octocat"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(AgentRegistry::with_extras(&[], &["(".to_string()]).is_err());
    }
}
