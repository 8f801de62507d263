//! Flowgate CLI - validate workflows and dry-run gated requests

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::de::DeserializeOwned;

use flowgate::output_policy::{render_reports, to_json};
use flowgate::validator::DefinitionFormat;
use flowgate::{
    change_status, ActivityLog, BusinessRuleGate, CampaignEvent, CampaignState, ChatEvent,
    ChatState, Clock, CreateWorkflowHandler, FixSuggestion, FixedClock, Fixtures, GateError,
    GateRules, GenerateReportHandler, InMemoryStore, OutputFormat, ReportRequest, StateMachine,
    SystemClock, Validator, WorkflowRequest,
};

#[derive(Parser)]
#[command(name = "flowgate")]
#[command(about = "Flowgate - workflow validation and business-rule gates")]
#[command(version)]
struct Cli {
    /// Rules file (YAML); built-in defaults when absent
    #[arg(long, global = true, env = "FLOWGATE_RULES")]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a workflow definition file or a directory of them
    Validate {
        /// Path to a .json/.yaml file or a directory
        path: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Show node, edge and complexity counts
        #[arg(short, long)]
        verbose: bool,
    },

    /// Dry-run workflow creation against fixture data
    Create {
        /// Workflow request file (name, description, user_id, structure)
        request: PathBuf,

        /// Users, workflow counts and counters to seed
        #[arg(long)]
        fixtures: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Dry-run analytics report gating against fixture data
    Report {
        /// Report request file (report_type, start_date, end_date, user_id)
        request: PathBuf,

        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Date to treat as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Apply a status event to a campaign or chat
    Transition {
        #[arg(value_enum)]
        aggregate: Aggregate,

        /// Current state (e.g. draft, open)
        state: String,

        /// Event to apply (e.g. activate, close)
        event: String,
    },

    /// Print the effective rule set as YAML
    Rules,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Aggregate {
    Campaign,
    Chat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.downcast_ref::<GateError>().and_then(|g| g.fix_suggestion()) {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let rules = GateRules::load(cli.rules.as_deref())?;

    match cli.command {
        Commands::Validate {
            path,
            format,
            verbose,
        } => validate(&rules, &path, format, verbose),
        Commands::Create {
            request,
            fixtures,
            format,
        } => create(rules, &request, fixtures.as_deref(), format),
        Commands::Report {
            request,
            fixtures,
            today,
            format,
        } => report(rules, &request, fixtures.as_deref(), today, format),
        Commands::Transition {
            aggregate,
            state,
            event,
        } => transition(aggregate, &state, &event),
        Commands::Rules => {
            print!("{}", rules.to_yaml()?);
            Ok(())
        }
    }
}

fn validate(rules: &GateRules, path: &Path, format: OutputFormat, verbose: bool) -> Result<()> {
    let validator = Validator::new(&rules.workflow);
    let reports = validator.validate_path(path)?;
    print!("{}", render_reports(&reports, format, verbose)?);

    let invalid = reports.iter().filter(|r| !r.is_valid()).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} workflow definition(s) invalid", invalid, reports.len());
    }
    Ok(())
}

fn create(
    rules: GateRules,
    request_path: &Path,
    fixtures: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let request: WorkflowRequest = read_request(request_path)?;
    let store = load_store(fixtures)?;
    let handler = CreateWorkflowHandler::new(
        Arc::new(BusinessRuleGate::new(rules)),
        Arc::new(store.clone()),
        Arc::new(store),
        ActivityLog::new(),
    );

    let created = handler.handle(request)?;
    match format {
        OutputFormat::Json => println!("{}", to_json(&created)?),
        OutputFormat::Text => {
            let workflow = &created.workflow.workflow;
            println!(
                "{} Workflow '{}' accepted (id {})",
                "✓".green(),
                workflow.name,
                created.workflow.id
            );
            println!(
                "  Owner: {} | Status: draft | Nodes: {} | Edges: {}",
                workflow.user_id,
                workflow.definition.node_count(),
                workflow.definition.edge_count()
            );
            println!(
                "  Complexity: {}{}",
                workflow.complexity_score,
                if created.is_complex { " (complex)" } else { "" }
            );
        }
    }
    Ok(())
}

fn report(
    rules: GateRules,
    request_path: &Path,
    fixtures: Option<&Path>,
    today: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    let request: ReportRequest = read_request(request_path)?;
    let store = load_store(fixtures)?;
    let clock: Arc<dyn Clock> = match today {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock),
    };
    let handler = GenerateReportHandler::new(
        Arc::new(BusinessRuleGate::new(rules)),
        Arc::new(store.clone()),
        Arc::new(store),
        clock,
        ActivityLog::new(),
    );

    let outcome = handler.handle(request)?;
    match format {
        OutputFormat::Json => println!("{}", to_json(&outcome)?),
        OutputFormat::Text => {
            println!(
                "{} Report '{}' approved for {}",
                "✓".green(),
                outcome.report_type,
                outcome.user_id
            );
            println!(
                "  Range: {} to {} ({} days) | Granularity: {:?} | Complexity: {}",
                outcome.start_date,
                outcome.end_date,
                outcome.range_days,
                outcome.granularity,
                outcome.complexity_score
            );
            println!("  Reports today: {}", outcome.generated_today);
        }
    }
    Ok(())
}

fn transition(aggregate: Aggregate, state: &str, event: &str) -> Result<()> {
    let activity = ActivityLog::new();
    let (from, to) = match aggregate {
        Aggregate::Campaign => {
            let current: CampaignState = state.parse().map_err(anyhow::Error::msg)?;
            let event: CampaignEvent = event.parse().map_err(anyhow::Error::msg)?;
            (current.name(), change_status(current, event, &activity)?.name())
        }
        Aggregate::Chat => {
            let current: ChatState = state.parse().map_err(anyhow::Error::msg)?;
            let event: ChatEvent = event.parse().map_err(anyhow::Error::msg)?;
            (current.name(), change_status(current, event, &activity)?.name())
        }
    };
    println!("{} {} {} {}", "✓".green(), from, "→".cyan(), to.bold());
    Ok(())
}

/// Parse a request file as JSON or YAML, by extension
fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {:?}", path))?;
    let parsed = match DefinitionFormat::from_path(path) {
        Some(DefinitionFormat::Json) => serde_json::from_str(&text).map_err(GateError::from),
        Some(DefinitionFormat::Yaml) => serde_yaml::from_str(&text).map_err(GateError::from),
        None => Err(GateError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    };
    parsed.with_context(|| format!("Failed to parse request file {:?}", path))
}

fn load_store(fixtures: Option<&Path>) -> Result<InMemoryStore> {
    Ok(match fixtures {
        Some(path) => InMemoryStore::from_fixtures(Fixtures::from_file(path)?),
        None => InMemoryStore::new(),
    })
}
