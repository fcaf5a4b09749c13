use std::path::{Path, PathBuf};

use agentlens_analysis::{
    AnalysisConfig, Analyzer, AttributionSummary, CorrelationResult, Stats, TextPatterns,
    ToolReport,
};

use crate::paths::LensPaths;

pub struct AnalyzeParams<'a> {
    pub repo_root: &'a Path,
    pub tools: &'a [String],
    pub window_hours: Option<f64>,
    pub count_inverse: bool,
    pub json: bool,
}

/// `NAME=DIR`, with DIR resolved against the working directory.
fn parse_tool_spec(paths: &LensPaths, spec: &str) -> anyhow::Result<(String, PathBuf)> {
    let Some((name, dir)) = spec.split_once('=') else {
        anyhow::bail!("Invalid --tool `{spec}`: expected NAME=DIR");
    };
    let (name, dir) = (name.trim(), dir.trim());
    if name.is_empty() || dir.is_empty() {
        anyhow::bail!("Invalid --tool `{spec}`: expected NAME=DIR");
    }
    Ok((name.to_string(), paths.resolve(dir)))
}

/// `agentlens analyze --tool NAME=DIR ...`
pub fn execute(params: &AnalyzeParams<'_>) -> anyhow::Result<()> {
    let paths = LensPaths::discover(params.repo_root);
    let specs = params
        .tools
        .iter()
        .map(|s| parse_tool_spec(&paths, s))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut config = AnalysisConfig::resolve(&paths.config_json)?;
    if let Some(hours) = params.window_hours {
        config.intervention_window_hours = hours;
    }
    if params.count_inverse {
        config.count_inverse_interventions = true;
    }
    let analyzer = Analyzer::new(&config)?;

    let mut reports = Vec::with_capacity(specs.len());
    let mut failed = 0;
    for (name, dir) in &specs {
        match agentlens_ingest::load_tool(name, dir) {
            Ok(bundle) => reports.push(analyzer.analyze_tool(&bundle)),
            Err(e) => {
                tracing::error!(tool = %name, error = %e, "tool skipped");
                failed += 1;
            }
        }
    }
    if reports.is_empty() {
        anyhow::bail!("All {failed} tool(s) failed to load");
    }

    if params.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }
    Ok(())
}

// ── Text Output ──

fn print_report(r: &ToolReport) {
    println!("== {} ==", r.tool);
    let f = &r.flow;
    println!(
        "Pull requests: {} (open {}, closed {}, merged {}, merge rate {:.1}%)",
        f.total,
        f.open,
        f.closed,
        f.merged,
        f.merge_rate * 100.0
    );
    print_stats("Time between commits (h)", &f.time_between_commits);
    print_summary("Commits", &r.attribution.commits);
    print_summary("Comments", &r.attribution.comments);
    print_summary("Reviews", &r.attribution.reviews);
    if !r.attribution.commits.top_human_identities.is_empty() {
        let top: Vec<String> = r
            .attribution
            .commits
            .top_human_identities
            .iter()
            .map(|t| format!("{} ({})", t.identity, t.count))
            .collect();
        println!("Top human committers: {}", top.join(", "));
    }

    let i = &r.intervention_stats;
    println!(
        "Interventions: {} across {} entities (mean {:.2}, median {:.2}, mean rate {:.3}, {} with at least one)",
        i.total_interventions,
        i.entities_analyzed,
        i.mean_per_entity,
        i.median_per_entity,
        i.mean_rate,
        i.entities_with_interventions
    );
    println!("Cycle time (h):");
    print_stats("  with agent", &r.cycle_time.with_agent);
    print_stats("  without agent", &r.cycle_time.without_agent);

    let fb = &r.feedback;
    println!("Feedback loop:");
    print_stats("  reviews per PR", &fb.reviews_per_pr);
    print_stats("  comments per PR", &fb.comments_per_pr);
    print_stats("  first review (h)", &fb.time_to_first_review_hours);
    print_stats("  last review (h)", &fb.review_time_hours);
    print_stats("  merge (h)", &fb.time_to_merge_hours);

    let c = &r.cognitive_load;
    println!(
        "Cognitive load: {} conventional commits, {} comments, commit interval mean {:.1}h (median {:.1}h), {:.1} commits per entity",
        c.conventional_commits,
        c.total_comments,
        c.commit_interval_hours.mean,
        c.commit_interval_hours.median,
        c.commits_per_entity.mean
    );

    let w = &r.workload;
    println!(
        "Workload: with agent {} PRs ({:.1} comments, {:.1} reviews, {:.1} commits), without agent {} PRs ({:.1} comments, {:.1} reviews, {:.1} commits)",
        w.with_agent.count,
        w.with_agent.avg_comments,
        w.with_agent.avg_reviews,
        w.with_agent.avg_commits,
        w.without_agent.count,
        w.without_agent.avg_comments,
        w.without_agent.avg_reviews,
        w.without_agent.avg_commits
    );
    println!(
        "Issues: {} ({:.1}% agent-reported), {} linked to pull requests",
        r.reporters.total_issues,
        r.reporters.agent_percentage,
        r.linked_issues.len()
    );

    let p = &r.profile;
    println!(
        "Profile: {} developers, {} repositories, {} languages (primary {}), {} stars, {} forks",
        p.developers,
        p.repositories,
        p.unique_languages,
        p.primary_language.as_deref().unwrap_or("N/A"),
        p.total_stars,
        p.total_forks
    );
    print_text_patterns(&r.text_patterns);

    if r.correlations.is_empty() {
        println!("Correlations: (none)");
    } else {
        println!("Correlations:");
        for c in &r.correlations {
            print_correlation(c);
        }
    }
    println!();
}

fn print_summary(label: &str, s: &AttributionSummary) {
    println!(
        "{label}: {} total, {} agent ({:.1}%), {} human; {} agent / {} human identities",
        s.total,
        s.agent_count,
        s.agent_percentage,
        s.human_count,
        s.distinct_agent_identities,
        s.distinct_human_identities
    );
}

fn print_stats(label: &str, s: &Stats) {
    println!(
        "{label}: n={} mean={:.1} median={:.1} std={:.1} min={:.1} max={:.1}",
        s.count, s.mean, s.median, s.std, s.min, s.max
    );
}

fn print_text_patterns(t: &TextPatterns) {
    if t.total == 0 {
        println!("Text patterns: (none)");
        return;
    }
    let parts: Vec<String> = t
        .categories
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| format!("{} {} ({:.1}%)", c.category, c.count, c.percentage))
        .collect();
    println!("Text patterns: {}", parts.join(", "));
}

fn print_correlation(c: &CorrelationResult) {
    let mark = if c.significant { " *" } else { "" };
    println!(
        "  {:<36} rho={:+.3} p={:.4} n={} {:?}{mark}",
        c.hypothesis, c.rho, c.p_value, c.n, c.strength
    );
}
