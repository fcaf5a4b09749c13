mod cmd_analyze;
mod cmd_classify;
mod cmd_config;
mod paths;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "agentlens",
    version,
    about = "Agent vs human attribution for pull-request exports"
)]
struct Cli {
    /// Debug-level logging (AGENTLENS_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one or more tool exports
    Analyze {
        /// Tool export as NAME=DIR (repeatable)
        #[arg(long = "tool", value_name = "NAME=DIR", required = true)]
        tools: Vec<String>,
        /// Intervention window in hours
        #[arg(long)]
        window_hours: Option<f64>,
        /// Also count human comment -> agent commit interventions
        #[arg(long)]
        count_inverse: bool,
        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify identities as agent or human
    Classify {
        /// Logins or author names
        #[arg(required = true)]
        identities: Vec<String>,
    },
    /// Manage .agentlens/config.json
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("AGENTLENS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let repo_root = std::env::current_dir()?;

    match cli.cmd {
        Command::Analyze {
            tools,
            window_hours,
            count_inverse,
            json,
        } => cmd_analyze::execute(&cmd_analyze::AnalyzeParams {
            repo_root: &repo_root,
            tools: &tools,
            window_hours,
            count_inverse,
            json,
        }),
        Command::Classify { identities } => cmd_classify::execute(&repo_root, &identities),
        Command::Config { cmd } => cmd_config::run(cmd, &repo_root),
    }
}
