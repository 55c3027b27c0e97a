//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use url::Url;

use leadscout_core::orchestrator::{
    Orchestrator, PipelineOptions, PipelineStage, ProgressReporter, RunSummary,
};
use leadscout_core::strategy::StrategyController;
use leadscout_gateway::AgentGateway;
use leadscout_shared::{
    AppConfig, GatewayConfig, LeadRecord, StrategyBundle, init_config, load_config,
    validate_agent_url,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LeadScout — turn a sponsor page into scored, strategy-ready leads.
#[derive(Parser)]
#[command(
    name = "leadscout",
    version,
    about = "Extract, score, and strategize conference sponsor leads via remote agents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the extraction → enrichment → synthesis pipeline for a URL.
    Run {
        /// Sponsor page URL to extract leads from.
        url: String,

        /// Enable the bulk-synthesis stage (battle-plan fields for every
        /// qualifying lead).
        #[arg(long)]
        bulk: bool,

        /// Override the configured agent base URL.
        #[arg(long, env = "LEADSCOUT_AGENT_URL")]
        agent_url: Option<String>,

        /// After the run, synthesize an outreach strategy for this company.
        #[arg(long)]
        strategy: Option<String>,
    },

    /// Synthesize an outreach strategy for a single company by name.
    Strategy {
        /// Company name to strategize for.
        company: String,

        /// Override the configured agent base URL.
        #[arg(long, env = "LEADSCOUT_AGENT_URL")]
        agent_url: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadscout=info",
        1 => "leadscout=debug",
        _ => "leadscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            url,
            bulk,
            agent_url,
            strategy,
        } => cmd_run(&url, bulk, agent_url.as_deref(), strategy.as_deref()).await,
        Command::Strategy { company, agent_url } => {
            cmd_strategy(&company, agent_url.as_deref()).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Build a gateway from config, with an optional CLI base-URL override.
fn build_gateway(config: &AppConfig, agent_url: Option<&str>) -> Result<AgentGateway> {
    let mut gateway_config = GatewayConfig::from(config);
    if let Some(override_url) = agent_url {
        gateway_config.base_url = override_url.to_string();
    }
    validate_agent_url(&gateway_config)?;

    Ok(AgentGateway::new(&gateway_config)?)
}

async fn cmd_run(
    url: &str,
    bulk: bool,
    agent_url: Option<&str>,
    strategy_for: Option<&str>,
) -> Result<()> {
    // Reject unparseable source URLs before touching the network.
    Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let config = load_config()?;
    let gateway = build_gateway(&config, agent_url)?;

    let mut options = PipelineOptions::from(&config);
    options.bulk_synthesis = options.bulk_synthesis || bulk;

    info!(url, bulk = options.bulk_synthesis, "starting pipeline");

    let reporter = CliProgress::new();
    let mut orchestrator = Orchestrator::new(gateway.clone(), options);

    match orchestrator.run(url, &reporter).await {
        Ok(summary) => {
            println!();
            println!("  Pipeline complete!");
            println!("  Leads:       {}", summary.lead_count);
            println!(
                "  Synthesis:   {}",
                if summary.synthesized { "bulk" } else { "skipped" }
            );
            println!("  Time:        {:.1}s", summary.elapsed.as_secs_f64());
            println!();
        }
        Err(e) => {
            reporter.clear();
            // Committed partial results survive a later-stage failure;
            // show whatever this run got before it died.
            if !orchestrator.store().is_empty() {
                println!();
                println!("  Pipeline failed after committing partial results:");
                print_records(orchestrator.store().records());
            }
            return Err(eyre!("{e}"));
        }
    }

    print_records(orchestrator.store().records());
    print_links(orchestrator.store().export_links());

    if let Some(company) = strategy_for {
        let record = orchestrator
            .store()
            .records()
            .iter()
            .find(|r| r.company.eq_ignore_ascii_case(company))
            .cloned()
            .ok_or_else(|| eyre!("company '{company}' not found in the extracted leads"))?;

        if !record.qualifies_for_strategy() {
            warn!(
                company = %record.company,
                fit = record.ordering_score(),
                "low fit score, strategy may be thin"
            );
        }

        let mut controller = StrategyController::new(gateway);
        let bundle = controller.generate(&record).await?;
        print_bundle(&record.company, &bundle);
    }

    Ok(())
}

async fn cmd_strategy(company: &str, agent_url: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let gateway = build_gateway(&config, agent_url)?;

    info!(company, "requesting single-lead strategy");

    let mut controller = StrategyController::new(gateway);
    let bundle = controller.generate(&LeadRecord::new(company)).await?;
    print_bundle(company, &bundle);

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output formatting
// ---------------------------------------------------------------------------

fn print_records(records: &[LeadRecord]) {
    if records.is_empty() {
        return;
    }

    println!("  {:<28} {:>4}  {:<20} {}", "Company", "Fit", "Category", "Recommendation");
    println!("  {}", "-".repeat(76));

    for record in records {
        let fit = match record.fit_score {
            Some(score) => format!("{score}"),
            None => "-".into(),
        };
        println!(
            "  {:<28} {:>4}  {:<20} {}",
            record.company,
            fit,
            record.category.as_deref().unwrap_or("-"),
            record.recommendation().unwrap_or("-"),
        );
    }
    println!();
}

fn print_links(links: &leadscout_shared::ExportLinkSet) {
    if let Some(basic) = &links.basic {
        println!("  Export (basic):         {basic}");
    }
    if let Some(comprehensive) = &links.comprehensive {
        println!("  Export (comprehensive): {comprehensive}");
    }
    if !links.is_empty() {
        println!();
    }
}

fn print_bundle(company: &str, bundle: &StrategyBundle) {
    println!("  Strategy for {company}");
    println!("  {}", "=".repeat(40));

    if !bundle.contacts.is_empty() {
        println!("  Key contacts:");
        for contact in &bundle.contacts {
            println!(
                "    {} ({}) — {} {}",
                contact.name, contact.title, contact.email, contact.linkedin
            );
        }
        println!();
    }

    if let Some(analysis) = &bundle.product_analysis {
        println!("  Why {}:", analysis.product);
        println!("    {}", analysis.why_perfect);
        for use_case in &analysis.use_cases {
            println!("    - {use_case}");
        }
        if let Some(roi) = &analysis.expected_roi {
            println!("    Expected ROI: {roi}");
        }
        println!();
    }

    if let Some(draft) = &bundle.email_draft {
        println!("  Email draft:");
        println!("    To:      {} <{}>", draft.to_name, draft.to_email);
        println!("    Subject: {}", draft.subject);
        println!();
        println!("{}", indent(&draft.body, "    "));
        println!();
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: PipelineStage) {
        self.spinner.set_message(stage.label());
    }

    fn leads_committed(&self, count: usize) {
        self.spinner
            .set_message(format!("{count} leads in working set"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
