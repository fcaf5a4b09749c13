pub mod attribution;
pub mod cadence;
pub mod config;
pub mod correlation;
pub mod cycle_time;
pub mod features;
pub mod feedback;
pub mod flow;
pub mod intervention;
pub mod issues;
pub mod profile;
pub mod report;
pub mod stats;
pub mod text_patterns;
pub mod workload;

pub use attribution::{
    aggregate, aggregate_top, attribute_entity, attribute_tool, AttributionSummary,
    EntityAttribution, RankedIdentity, ToolAttribution,
};
pub use cadence::{cognitive_load, is_conventional_commit, CognitiveLoad};
pub use config::{AnalysisConfig, ConfigError};
pub use correlation::{correlate, spearman, CorrelationResult, Hypothesis, Strength, HYPOTHESES};
pub use cycle_time::{cycle_time_hours, cycle_times, CycleTimeReport};
pub use features::FeatureRow;
pub use feedback::{feedback_loop, FeedbackLoop};
pub use flow::{summarize_flow, FlowSummary};
pub use intervention::{detect, detect_entity, InterventionConfig, InterventionRecord, InterventionStats};
pub use issues::{link_issues, summarize_reporters, IssueAttribution, ReporterSummary};
pub use profile::{summarize_profile, ProfileSummary};
pub use report::{analyze_tool, analyze_tools, Analyzer, ToolReport};
pub use stats::Stats;
pub use text_patterns::{text_patterns, CategoryCount, TextPatterns};
pub use workload::{compare_workload, Workload, WorkloadComparison};
