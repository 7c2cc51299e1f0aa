use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use event_autofill::orchestrator::load_targets;
use event_autofill::{
    ChatCompletionClient, ChromiumLauncher, CompletionConfig, FlowSettings, Orchestrator,
    ValuePolicy,
};

/// Fill event registration forms with model-generated answers, then leave
/// them open for review.
#[derive(Parser)]
#[command(name = "event-autofill")]
#[command(version)]
struct Cli {
    /// JSON array of {"name", "registration_url"} entries
    #[arg(short, long)]
    events: PathBuf,

    /// File describing the person registering
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Extra registrant description, appended after --profile
    #[arg(short, long, default_value = "")]
    context: String,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    /// Chrome profile directory to reuse (keeps site logins)
    #[arg(long, env = "CHROME_USER_DATA_DIR")]
    user_data_dir: Option<PathBuf>,

    /// Chrome executable
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Seconds each filled form stays open for review
    #[arg(long, default_value_t = 30)]
    review_secs: u64,

    /// Accept numbers, booleans and lists from the model as text
    #[arg(long)]
    coerce_values: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn registrant_context(cli: &Cli) -> Result<String> {
    let mut context = match &cli.profile {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?,
        None => String::new(),
    };
    if !cli.context.is_empty() {
        if !context.is_empty() {
            context.push('\n');
        }
        context.push_str(&cli.context);
    }
    Ok(context.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let completion_config = CompletionConfig::from_env().context("loading completion settings")?;
    let targets = load_targets(&cli.events)
        .with_context(|| format!("reading events from {}", cli.events.display()))?;
    let additional_context = registrant_context(&cli)?;

    let mut browser = ChromiumLauncher::builder().headless(cli.headless);
    if let Some(dir) = &cli.user_data_dir {
        browser = browser.user_data_dir(dir);
    }
    if let Some(path) = &cli.chrome_path {
        browser = browser.chrome_path(path);
    }

    let settings = FlowSettings {
        review_pause: Duration::from_secs(cli.review_secs),
        value_policy: if cli.coerce_values {
            ValuePolicy::Coerce
        } else {
            ValuePolicy::Drop
        },
        ..FlowSettings::default()
    };

    info!(model = %completion_config.model, endpoint = %completion_config.base_url, "using completion service");
    let completion = ChatCompletionClient::new(completion_config)?;
    let orchestrator = Orchestrator::new(browser.build(), completion, settings);

    let runs = orchestrator.run_all(&targets, &additional_context).await;
    let succeeded = runs.iter().filter(|r| r.succeeded()).count();
    info!(succeeded, failed = runs.len() - succeeded, "done");

    Ok(())
}
