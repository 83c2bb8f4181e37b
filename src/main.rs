// Incident Responder - command-line entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use incident_responder::models::settings::{FilterPolicy, SettingsUpdate};
use incident_responder::storage::ConfigService;
use incident_responder::AppState;
use responder_core::IncidentRequest;
use responder_logstore::Scenario;
use responder_tools::{SearchLogsRequest, SearchLogsTool};

#[derive(Parser)]
#[command(name = "incident-responder")]
#[command(about = "Runbook-grounded incident diagnosis agent", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to <config_dir>/incident-responder/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose an incident and print the verdict as JSON
    Analyze(AnalyzeArgs),
    /// Run the log search tool directly against a scenario
    SearchLogs(SearchLogsArgs),
    /// List the simulated fault scenarios
    Scenarios,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Affected service, e.g. payment-service
    #[arg(long)]
    service: String,

    /// Symptom description
    #[arg(long)]
    issue: String,

    /// Look-back window for log searches
    #[arg(long)]
    time_window: Option<String>,

    /// Fault scenario loaded into the log store
    #[arg(long)]
    scenario: Option<String>,

    /// Mark a service as DOWN (repeatable)
    #[arg(long = "down", value_name = "SERVICE")]
    down: Vec<String>,

    /// Restrict grounding runbooks to the requested service
    #[arg(long)]
    strict: bool,

    /// Metadata filter policy
    #[arg(long, value_enum)]
    filter_policy: Option<PolicyArg>,

    #[arg(long)]
    top_k: Option<usize>,

    #[arg(long)]
    min_score: Option<f32>,

    #[arg(long)]
    temperature: Option<f32>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible endpoint, e.g. http://localhost:11434/v1
    #[arg(long)]
    base_url: Option<String>,

    /// Runbook directory override
    #[arg(long)]
    runbooks: Option<String>,
}

#[derive(Args)]
struct SearchLogsArgs {
    /// Lucene-style query
    #[arg(long)]
    query: String,

    #[arg(long)]
    scenario: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Mandatory,
    Optional,
}

impl From<PolicyArg> for FilterPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Mandatory => FilterPolicy::Mandatory,
            PolicyArg::Optional => FilterPolicy::Optional,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<ConfigService> {
    let path = match path {
        Some(path) => path,
        None => ConfigService::default_path().context("Failed to resolve config path")?,
    };
    ConfigService::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

async fn analyze(config: ConfigService, args: AnalyzeArgs) -> Result<()> {
    let mut config = config;
    let config = config
        .apply_overrides(SettingsUpdate {
            model: args.model,
            base_url: args.base_url,
            top_k: args.top_k,
            min_score: args.min_score,
            temperature: args.temperature,
            strict_metadata_filtering: args.strict.then_some(true),
            filter_policy: args.filter_policy.map(FilterPolicy::from),
            runbook_dir: args.runbooks,
            scenario: args.scenario,
            unhealthy_services: args.down,
        })
        .context("Invalid settings")?
        .clone();

    let state = AppState::new(config).context("Failed to initialize simulation")?;
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let library = state
        .runbook_library(&cwd)
        .context("Failed to load runbooks")?;
    let provider = state.provider().context("Failed to create model provider")?;
    let agent = state.agent(provider, Arc::new(library));

    let mut request = IncidentRequest::new(args.service, args.issue);
    if let Some(window) = args.time_window {
        request = request.with_time_window(window);
    }

    let run_config = state
        .config()
        .agent_config()
        .context("Invalid agent configuration")?;
    let response = agent
        .analyze_with(&request, &run_config)
        .await
        .context("Analysis failed")?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn search_logs(config: ConfigService, args: SearchLogsArgs) -> Result<()> {
    let mut config = config.into_config();
    if let Some(scenario) = args.scenario {
        config.simulation.initial_scenario = scenario;
    }
    let state = AppState::new(config).context("Failed to initialize simulation")?;
    let tool = SearchLogsTool::new(state.log_store());
    let response = tool.search(&SearchLogsRequest {
        query: args.query,
        time_window: None,
    });
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn list_scenarios() {
    for scenario in Scenario::ALL {
        println!("{:<30} {}", scenario.name(), scenario.description());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze(load_config(cli.config)?, args).await,
        Commands::SearchLogs(args) => search_logs(load_config(cli.config)?, args),
        Commands::Scenarios => {
            list_scenarios();
            Ok(())
        }
    }
}
