use std::path::Path;

use agentlens_analysis::AnalysisConfig;

use crate::paths::LensPaths;

/// `agentlens classify <identity>...`
pub fn execute(repo_root: &Path, identities: &[String]) -> anyhow::Result<()> {
    let paths = LensPaths::discover(repo_root);
    let registry = AnalysisConfig::resolve(&paths.config_json)?.registry()?;
    for identity in identities {
        let label = if registry.is_agent(identity) { "agent" } else { "human" };
        println!("{identity}\t{label}");
    }
    Ok(())
}
