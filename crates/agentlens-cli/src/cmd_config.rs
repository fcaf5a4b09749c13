use std::io::Write;
use std::path::Path;

use agentlens_analysis::config::{ENV_OVERRIDES, KEYS};
use agentlens_analysis::AnalysisConfig;
use clap::Subcommand;
use serde_json::{Map, Value};

use crate::paths::LensPaths;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. intervention_window_hours)
        key: String,
        /// Config value (true/false/number/string, comma-separated for lists)
        value: String,
    },
    /// Get the effective value of a config key
    Get {
        /// Config key
        key: String,
    },
    /// List every config key with its effective value and source
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Set { key, value } => set(repo_root, &key, &value),
        ConfigCmd::Get { key } => get(repo_root, &key),
        ConfigCmd::List => list(repo_root),
    }
}

// ── Command Implementations ──

/// Read `.agentlens/config.json`. Returns an empty map if the file doesn't exist.
fn read_config(path: &Path) -> anyhow::Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Write the config through a temp file inside `.agentlens/`.
fn write_config(paths: &LensPaths, config: &Map<String, Value>) -> anyhow::Result<()> {
    std::fs::create_dir_all(&paths.lens_dir)?;
    let json = serde_json::to_string_pretty(config)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&paths.lens_dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    tmp.persist(&paths.config_json)?;
    Ok(())
}

fn is_list_key(key: &str) -> bool {
    matches!(key, "extra_agent_names" | "extra_agent_patterns")
}

/// Parse a string value into an appropriate JSON value (bool/number/string,
/// or an array of strings for list keys).
fn parse_value(key: &str, s: &str) -> Value {
    if is_list_key(key) {
        return Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.to_string()))
                .collect(),
        );
    }
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                Value::Number(n.into())
            } else if let Ok(f) = s.parse::<f64>() {
                serde_json::json!(f)
            } else {
                Value::String(s.to_string())
            }
        }
    }
}

/// `agentlens config set <key> <value>`
pub fn set(repo_root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let paths = LensPaths::discover(repo_root);
    if !KEYS.contains(&key) {
        anyhow::bail!("Unknown config key `{key}`. Known keys: {}", KEYS.join(", "));
    }
    let mut config = read_config(&paths.config_json)?;
    config.insert(key.to_string(), parse_value(key, value));

    // Reject values the analysis would refuse to load.
    let parsed: AnalysisConfig = serde_json::from_value(Value::Object(config.clone()))
        .map_err(|e| anyhow::anyhow!("Invalid value for `{key}`: {e}"))?;
    parsed.validate()?;
    parsed.registry()?;

    write_config(&paths, &config)?;
    println!("{key} = {}", config[key]);
    Ok(())
}

/// Where an effective value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Default,
    File,
    Env,
}

impl Source {
    fn label(self) -> &'static str {
        match self {
            Source::Default => "default",
            Source::File => "config.json",
            Source::Env => "env",
        }
    }
}

/// Every known key with the value the analysis would run with.
fn effective<F>(paths: &LensPaths, lookup: F) -> anyhow::Result<Vec<(&'static str, Value, Source)>>
where
    F: Fn(&str) -> Option<String>,
{
    let file = read_config(&paths.config_json)?;
    let resolved = AnalysisConfig::load(&paths.config_json)?.with_env(&lookup)?;
    let Value::Object(values) = serde_json::to_value(&resolved)? else {
        anyhow::bail!("config did not serialize to an object");
    };
    Ok(KEYS
        .iter()
        .map(|&key| {
            let from_env = ENV_OVERRIDES
                .iter()
                .any(|&(k, var)| k == key && lookup(var).is_some());
            let source = if from_env {
                Source::Env
            } else if file.contains_key(key) {
                Source::File
            } else {
                Source::Default
            };
            (key, values.get(key).cloned().unwrap_or(Value::Null), source)
        })
        .collect())
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// `agentlens config get <key>`
pub fn get(repo_root: &Path, key: &str) -> anyhow::Result<()> {
    if !KEYS.contains(&key) {
        anyhow::bail!("Unknown config key `{key}`. Known keys: {}", KEYS.join(", "));
    }
    let paths = LensPaths::discover(repo_root);
    for (k, value, source) in effective(&paths, process_env)? {
        if k == key {
            println!("{value}  ({})", source.label());
        }
    }
    Ok(())
}

/// `agentlens config list`
pub fn list(repo_root: &Path) -> anyhow::Result<()> {
    let paths = LensPaths::discover(repo_root);
    for (key, value, source) in effective(&paths, process_env)? {
        println!("{key} = {value}  ({})", source.label());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlens_analysis::config::ENV_WINDOW_HOURS;

    #[test]
    fn parse_value_types() {
        assert_eq!(parse_value("count_inverse_interventions", "true"), Value::Bool(true));
        assert_eq!(parse_value("top_n", "5"), serde_json::json!(5));
        assert_eq!(parse_value("intervention_window_hours", "12.5"), serde_json::json!(12.5));
        assert_eq!(
            parse_value("extra_agent_names", "jarvis, hal ,"),
            serde_json::json!(["jarvis", "hal"])
        );
    }

    #[test]
    fn set_then_read_back() {
        let tmp = tempfile::tempdir().unwrap();
        set(tmp.path(), "intervention_window_hours", "24").unwrap();
        set(tmp.path(), "extra_agent_names", "jarvis").unwrap();
        let paths = LensPaths::discover(tmp.path());
        let cfg = AnalysisConfig::load(&paths.config_json).unwrap();
        assert_eq!(cfg.intervention_window_hours, 24.0);
        assert_eq!(cfg.extra_agent_names, vec!["jarvis"]);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(set(tmp.path(), "colour", "blue").is_err());
        assert!(set(tmp.path(), "top_n", "many").is_err());
        assert!(set(tmp.path(), "extra_agent_patterns", "(").is_err());
        assert!(!LensPaths::discover(tmp.path()).config_json.exists());
    }

    #[test]
    fn set_creates_the_lens_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = LensPaths::discover(tmp.path());
        assert!(!paths.lens_dir.exists());
        set(tmp.path(), "top_n", "3").unwrap();
        assert!(paths.lens_dir.is_dir());
        assert!(paths.config_json.is_file());
    }

    #[test]
    fn effective_values_report_their_source() {
        let tmp = tempfile::tempdir().unwrap();
        set(tmp.path(), "top_n", "3").unwrap();
        set(tmp.path(), "intervention_window_hours", "24").unwrap();
        let paths = LensPaths::discover(tmp.path());
        let env = |key: &str| (key == ENV_WINDOW_HOURS).then(|| "6".to_string());

        let entries = effective(&paths, env).unwrap();
        assert_eq!(entries.len(), KEYS.len());
        let find = |k: &str| entries.iter().find(|e| e.0 == k).unwrap().clone();
        assert_eq!(find("top_n").1, serde_json::json!(3));
        assert_eq!(find("top_n").2, Source::File);
        assert_eq!(find("intervention_window_hours").1, serde_json::json!(6.0));
        assert_eq!(find("intervention_window_hours").2, Source::Env);
        assert_eq!(find("count_inverse_interventions").1, Value::Bool(false));
        assert_eq!(find("count_inverse_interventions").2, Source::Default);
        assert_eq!(find("extra_agent_names").1, serde_json::json!([]));
    }

    #[test]
    fn effective_values_without_a_config_file_are_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let entries = effective(&LensPaths::discover(tmp.path()), |_| None).unwrap();
        assert!(entries.iter().all(|(_, _, source)| *source == Source::Default));
        assert!(entries.iter().any(|(k, v, _)| *k == "intervention_window_hours" && *v == serde_json::json!(72.0)));
        assert!(get(tmp.path(), "colour").is_err());
    }
}
