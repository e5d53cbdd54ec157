use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use channel_sorter::channels::SlackClient;
use channel_sorter::config::{ClassifierSettings, SLACK_TIMEOUT, ServerConfig, channel_env_var};
use channel_sorter::eval;
use channel_sorter::llm::create_provider;
use channel_sorter::pipeline::{Classifier, EventGate, MessageProcessor, Router};
use channel_sorter::server::{AppState, routes};

#[derive(Debug, Parser)]
#[command(
    name = "channel-sorter",
    version,
    about = "Sorts Slack messages from a source channel into topic channels"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the Slack Events webhook server (default)
    Serve,
    /// Measure classifier accuracy against a labelled JSONL dataset
    Eval {
        /// JSONL file of {"text": ..., "label": ...} lines
        dataset: PathBuf,
        /// Where to write misclassified cases
        #[arg(long, default_value = "misclassifications.jsonl")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Eval { dataset, out } => run_eval(dataset, out).await,
    }
}

fn build_classifier() -> anyhow::Result<Classifier> {
    let settings = ClassifierSettings::from_env()?;
    let llm = create_provider(settings.llm)?;
    Ok(Classifier::new(llm, settings.classifier))
}

async fn serve() -> anyhow::Result<()> {
    let classifier = build_classifier()?;
    let config = ServerConfig::from_env()?;

    for category in config.channels.unconfigured() {
        tracing::warn!(
            %category,
            env_var = channel_env_var(category),
            "No destination channel configured; messages in this category will only be confirmed"
        );
    }

    let slack = SlackClient::new(config.slack_bot_token, &config.slack_api_base, SLACK_TIMEOUT)?;
    let router = Router::new(config.channels, Arc::new(slack))
        .with_source_channel_name(config.source_channel_name)
        .with_confirm_policy(config.confirm_policy);

    eprintln!("channel-sorter v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", classifier.model_name());
    eprintln!("   Source channel: {}", config.source_channel_id);
    eprintln!("   Confirmations: {:?}", config.confirm_policy);
    eprintln!("   Events: http://0.0.0.0:{}/slack/events\n", config.port);

    let processor = MessageProcessor::new(EventGate::new(config.source_channel_id), classifier, router);
    let app = routes(AppState::new(Arc::new(processor), config.slack_signing_secret));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_eval(dataset: PathBuf, out: PathBuf) -> anyhow::Result<()> {
    let classifier = build_classifier()?;
    let cases = eval::load_dataset(&dataset).await?;
    tracing::info!(cases = cases.len(), path = %dataset.display(), "Loaded evaluation dataset");

    let report = eval::run(&classifier, &cases).await;
    print!("{report}");

    if !report.misclassifications.is_empty() {
        report.write_misclassifications(&out).await?;
        println!(
            "Wrote {} misclassifications to {}",
            report.misclassifications.len(),
            out.display()
        );
    }
    Ok(())
}
