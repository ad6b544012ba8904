use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use hnhype::analysis::{analyze_hn_post_flow, CLASSIFICATION_STEP, FLOW_SLUG};
use hnhype::compare::{render, replay};
use hnhype::hn::parse_item_id;
use hnhype::models::FlowInput;
use hnhype::{
    AnalyzeHnPost, ClaudeClassifier, Classifier, CompareConfig, Config, FlowClient, HistorySource,
    HnClient, LocalRunner, PgHistory,
};

#[derive(Parser, Debug)]
#[command(name = "hnhype")]
#[command(version = "0.1.0")]
#[command(about = "Classify Hacker News posts with an LLM and replay stored runs against other models")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the classification flow in this process and print every step's output
    Run {
        /// Hacker News item URL, e.g. https://news.ycombinator.com/item?id=1
        url: String,
    },

    /// Start a run of the classification flow in the workflow engine
    Start {
        /// Hacker News item URL
        url: String,
    },

    /// Show a run's status and, once completed, its classification
    Status {
        /// Run id printed by `start`
        run_id: Uuid,
    },

    /// Print the SQL that registers the flow with the workflow engine
    Flow,

    /// Replay stored runs through other models and print a diff report
    Compare {
        /// Number of stored runs to replay
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Model to compare (repeatable, defaults to the built-in set)
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Show a progress bar while calls are in flight
        #[arg(long)]
        progress: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("hnhype=info".parse()?)
                .add_directive("reqwest=warn".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match args.command {
        Command::Flow => print!("{}", analyze_hn_post_flow().to_sql()?),
        // Fail on a missing credential before any network call
        command => run_command(command, Config::from_env()?).await?,
    }

    Ok(())
}

async fn run_command(command: Command, config: Config) -> anyhow::Result<()> {
    match command {
        Command::Run { url } => {
            parse_item_id(&url)?;
            let hn = HnClient::with_base_url(&config.hn_api_base_url)?;
            let classifier = ClaudeClassifier::with_base_url(
                config.anthropic_api_key.clone(),
                &config.anthropic_base_url,
            )?;
            tracing::info!(
                "Classifying with {} ({})",
                classifier.name(),
                config.classifier_model
            );
            let handler = AnalyzeHnPost::new(hn, classifier, config.classifier_model.clone());

            let input = serde_json::to_value(FlowInput { url })?;
            let output = LocalRunner::run(&analyze_hn_post_flow(), &handler, input).await?;
            tracing::info!(
                "Flow '{}' finished with {} step outputs",
                output.flow_slug,
                output.outputs.len()
            );
            println!("{}", serde_json::to_string_pretty(&output.to_json())?);
        }
        Command::Start { url } => {
            parse_item_id(&url)?;
            let client = FlowClient::connect(config.database_url()?).await?;
            let input = serde_json::to_value(FlowInput { url })?;
            let run_id = client.start_run(FLOW_SLUG, &input).await?;
            println!("{}", run_id);
        }
        Command::Status { run_id } => {
            let client = FlowClient::connect(config.database_url()?).await?;
            let status = client.run_status(run_id).await?;

            println!("Run:    {}", status.run_id);
            println!("Flow:   {}", status.flow_slug);
            println!("Status: {} ({} steps remaining)", status.status, status.remaining_steps);
            for step in &status.steps {
                println!("  - {:<16} {}", step.step_slug, step.status);
            }

            if status.is_finished() {
                match client.step_output(run_id, CLASSIFICATION_STEP).await? {
                    Some(output) => println!("{}", serde_json::to_string_pretty(&output)?),
                    None => println!("No classification output recorded"),
                }
            }
        }
        Command::Compare {
            limit,
            models,
            progress,
        } => {
            let mut compare = CompareConfig {
                limit,
                show_progress: progress,
                ..CompareConfig::default()
            };
            if !models.is_empty() {
                compare.models = models;
            }

            let client = FlowClient::connect(config.database_url()?).await?;
            let history = PgHistory::new(client.pool().clone());
            let classifier = ClaudeClassifier::with_base_url(
                config.anthropic_api_key.clone(),
                &config.anthropic_base_url,
            )?;

            let rows = history.load(compare.limit).await?;
            let comparisons =
                replay(&classifier, rows, &compare.models, compare.show_progress).await;
            print!("{}", render(&comparisons));
        }
        Command::Flow => {}
    }

    Ok(())
}
