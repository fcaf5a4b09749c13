//! One analysis pass over one tool's bundle.

use std::collections::{HashMap, HashSet};

use agentlens_core::record::decode;
use agentlens_core::{
    AgentRegistry, EntityEvents, Normalizer, PullRequest, RawIssue, RawPullRequest, ToolBundle,
};
use serde::Serialize;

use crate::attribution::{attribute_entity, attribute_tool, EntityAttribution, ToolAttribution};
use crate::cadence::{cognitive_load, CognitiveLoad};
use crate::config::{AnalysisConfig, ConfigError};
use crate::correlation::{correlate, CorrelationResult};
use crate::cycle_time::{cycle_times, CycleTimeReport};
use crate::feedback::{feedback_loop, FeedbackLoop};
use crate::features::FeatureRow;
use crate::flow::{summarize_flow, FlowSummary};
use crate::intervention::{detect_entity, summarize, InterventionConfig, InterventionRecord, InterventionStats};
use crate::issues::{link_issues, summarize_reporters, IssueAttribution, ReporterSummary};
use crate::profile::{summarize_profile, ProfileSummary};
use crate::text_patterns::{text_patterns, TextPatterns};
use crate::workload::{compare_workload, WorkloadComparison};

/// Everything one pass produces for one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolReport {
    pub tool: String,
    pub attribution: ToolAttribution,
    /// Pull requests first, then other entities that only appear in the
    /// event streams.
    pub entities: Vec<EntityAttribution>,
    pub interventions: Vec<InterventionRecord>,
    pub intervention_stats: InterventionStats,
    pub cycle_time: CycleTimeReport,
    pub flow: FlowSummary,
    pub feedback: FeedbackLoop,
    pub cognitive_load: CognitiveLoad,
    pub workload: WorkloadComparison,
    pub profile: ProfileSummary,
    pub text_patterns: TextPatterns,
    pub reporters: ReporterSummary,
    pub linked_issues: Vec<IssueAttribution>,
    pub features: Vec<FeatureRow>,
    pub correlations: Vec<CorrelationResult>,
}

/// Settings compiled once and shared by every tool pass.
#[derive(Debug)]
pub struct Analyzer {
    registry: AgentRegistry,
    intervention: InterventionConfig,
    top_n: usize,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: config.registry()?,
            intervention: config.intervention(),
            top_n: config.top_n,
        })
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn analyze_tool(&self, bundle: &ToolBundle) -> ToolReport {
        let _span = tracing::info_span!("tool", name = %bundle.name).entered();
        let normalizer = Normalizer::new(&self.registry);

        let prs = pull_requests(bundle);
        let scope = entity_scope(&prs, normalizer.all_entities(bundle));

        let attributions: Vec<EntityAttribution> =
            scope.iter().map(|e| attribute_entity(e, self.top_n)).collect();
        let interventions: Vec<InterventionRecord> =
            scope.iter().map(|e| detect_entity(e, &self.intervention)).collect();

        let by_id: HashMap<&str, usize> = scope
            .iter()
            .enumerate()
            .map(|(i, e)| (e.entity_id.as_str(), i))
            .collect();
        let linked: HashSet<&str> = bundle.links.iter().map(|l| l.pr_id.as_str()).collect();

        // PRs occupy the head of `scope`, in order.
        let features: Vec<FeatureRow> = prs
            .iter()
            .zip(&attributions)
            .map(|(pr, a)| FeatureRow::build(pr, a, linked.contains(pr.id.as_str())))
            .collect();
        let cycle_time = cycle_times(prs.iter().zip(&scope));
        let feedback = feedback_loop(prs.iter().zip(&scope));

        let issues: Vec<RawIssue> = bundle.issues.iter().filter_map(decode).collect();
        let linked_issues = link_issues(&issues, &bundle.links, &self.registry, |pr_id| {
            match by_id.get(pr_id) {
                Some(&i) => attributions[i].clone(),
                None => attribute_entity(&EntityEvents::empty(pr_id), self.top_n),
            }
        });

        let report = ToolReport {
            tool: bundle.name.clone(),
            attribution: attribute_tool(&scope, self.top_n),
            intervention_stats: summarize(&interventions),
            cycle_time,
            flow: summarize_flow(&prs, &scope),
            feedback,
            cognitive_load: cognitive_load(bundle),
            workload: compare_workload(&features),
            profile: summarize_profile(&bundle.developers, &bundle.repositories),
            text_patterns: text_patterns(bundle),
            reporters: summarize_reporters(&issues, &self.registry, self.top_n),
            linked_issues,
            correlations: correlate(&bundle.name, &features),
            features,
            entities: attributions,
            interventions,
        };
        tracing::info!(
            pull_requests = prs.len(),
            entities = report.entities.len(),
            interventions = report.intervention_stats.total_interventions,
            correlations = report.correlations.len(),
            "analysis pass complete"
        );
        report
    }

    /// Independent passes, reported in input order.
    pub fn analyze_tools(&self, bundles: &[ToolBundle]) -> Vec<ToolReport> {
        bundles.iter().map(|b| self.analyze_tool(b)).collect()
    }
}

pub fn analyze_tool(bundle: &ToolBundle, config: &AnalysisConfig) -> Result<ToolReport, ConfigError> {
    Ok(Analyzer::new(config)?.analyze_tool(bundle))
}

pub fn analyze_tools(bundles: &[ToolBundle], config: &AnalysisConfig) -> Result<Vec<ToolReport>, ConfigError> {
    Ok(Analyzer::new(config)?.analyze_tools(bundles))
}

/// Decoded pull requests; the first record wins when an id repeats.
fn pull_requests(bundle: &ToolBundle) -> Vec<PullRequest> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut skipped = 0;
    for value in &bundle.pull_requests {
        match decode::<RawPullRequest>(value).and_then(PullRequest::from_raw) {
            Some(pr) if seen.insert(pr.id.clone()) => out.push(pr),
            Some(pr) => tracing::debug!(id = %pr.id, "duplicate pull request ignored"),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "pull request records without a usable id");
    }
    out
}

/// One event set per pull request (empty when it has no records), followed
/// by the remaining entities in first-seen order.
fn entity_scope(prs: &[PullRequest], entities: Vec<EntityEvents>) -> Vec<EntityEvents> {
    let mut order: Vec<String> = Vec::with_capacity(entities.len());
    let mut pool: HashMap<String, EntityEvents> = HashMap::with_capacity(entities.len());
    for e in entities {
        order.push(e.entity_id.clone());
        pool.insert(e.entity_id.clone(), e);
    }
    let mut scope: Vec<EntityEvents> = prs
        .iter()
        .map(|pr| pool.remove(&pr.id).unwrap_or_else(|| EntityEvents::empty(pr.id.as_str())))
        .collect();
    scope.extend(order.iter().filter_map(|id| pool.remove(id)));
    scope
}
