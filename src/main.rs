//! Elevate Matchmaker - Main Server
//!
//! Startup-ecosystem matchmaking backend with Neo4j and an LLM provider.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use elevate_matchmaker::{
    entity::{EntitySchema, EntityType},
    feed::parse_fields,
    suggestion::local_timestamp,
    AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "matchmaker")]
#[command(about = "Startup-ecosystem matchmaking server")]
struct Cli {
    /// Path to a YAML config file (defaults to ./config.yaml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one matchmaking round over the queued entities
    Generate {
        /// Restrict the round to these entity ids (repeatable)
        #[arg(short, long = "entity-id")]
        entity_ids: Vec<String>,
    },

    /// Import profiles from a JSON array and queue them for matchmaking
    Import {
        /// JSON file holding an array of Startup/Enabler profiles
        file: std::path::PathBuf,
    },

    /// Print the suggestion feed of one entity
    Suggestions {
        /// STARTUP or ENABLER
        entity_type: EntityType,
        entity_id: String,
        /// Comma-separated auxiliary fields to include (e.g. contacts,founders)
        #[arg(short, long)]
        fields: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            elevate_matchmaker::start_server(config).await
        }
        Commands::Generate { entity_ids } => run_generate(config, &entity_ids).await,
        Commands::Import { file } => run_import(config, &file).await,
        Commands::Suggestions {
            entity_type,
            entity_id,
            fields,
        } => run_suggestions(config, entity_type, &entity_id, fields.as_deref()).await,
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,elevate_matchmaker=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run_generate(config: Config, entity_ids: &[String]) -> Result<()> {
    let state = AppState::new(config).await?;

    let filter = (!entity_ids.is_empty()).then_some(entity_ids);
    let matches = state
        .orchestrator()
        .get_suggestions(filter)
        .await
        .map_err(|e| anyhow::anyhow!("Suggestion generation failed ({})", e))?;

    tracing::info!(matches = matches.len(), "Suggestion generation complete");
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

async fn run_import(config: Config, file: &std::path::Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let profiles: Vec<EntitySchema> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse profiles from {}", file.display()))?;

    let state = AppState::new(config).await?;
    let repo = state.entities();
    let created_at = local_timestamp();

    let mut written = 0;
    for profile in &profiles {
        written += repo
            .put_entity(profile, &created_at)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to import {} ({})", profile.hash_key(), e))?;
    }

    tracing::info!(
        profiles = profiles.len(),
        items = written,
        "Import complete"
    );
    Ok(())
}

async fn run_suggestions(
    config: Config,
    entity_type: EntityType,
    entity_id: &str,
    fields: Option<&str>,
) -> Result<()> {
    let state = AppState::new(config).await?;
    let fields = parse_fields(fields);

    let feed = state
        .feed()
        .suggested_profiles(entity_type, entity_id, &fields)
        .await;
    println!("{}", serde_json::to_string_pretty(&feed)?);
    Ok(())
}
